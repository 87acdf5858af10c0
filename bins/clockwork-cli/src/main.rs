//! clockwork-cli: command-line driver for a Clockwork ledger.
//!
//! Replays JSON operation scripts against a ledger kept in a JSON state
//! file, and exposes the pure helpers (price curve, commitments) directly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use clockwork_auction::pricing::current_price;
use clockwork_core::crypto::commitment_hash;
use clockwork_core::types::{Identity, Secret};
use clockwork_ledger::label::{self, parse_identity};
use clockwork_ledger::{Ledger, LedgerConfig, LogFormat, Operation, StateFile};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Clockwork ledger command-line interface.
#[derive(Parser)]
#[command(name = "clockwork-cli")]
#[command(version, about = "Dutch auctions and commit-reveal lotteries on one deterministic ledger.")]
struct Cli {
    /// Config file (TOML or JSON). `CLOCKWORK__*` variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (overrides config; `RUST_LOG` overrides both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format: text or json.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON script of steps against the ledger and print one line per step.
    Replay(ReplayArgs),
    /// Show height, tip, listings and the lottery round.
    Status(StateArgs),
    /// Evaluate the auction price curve.
    Price(PriceArgs),
    /// Print the commitment for an identity and secret.
    Commit(CommitArgs),
}

#[derive(Args)]
struct StateArgs {
    /// State file (default: <data_dir>/state.json).
    #[arg(short, long)]
    state: Option<PathBuf>,
}

#[derive(Args)]
struct ReplayArgs {
    /// Script file: a JSON array of steps.
    script: PathBuf,

    #[command(flatten)]
    state: StateArgs,

    /// Do not write the resulting state back.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct PriceArgs {
    #[arg(long)]
    start: u64,
    #[arg(long)]
    end: u64,
    #[arg(long)]
    duration: u64,
    #[arg(long)]
    elapsed: u64,
}

#[derive(Args)]
struct CommitArgs {
    /// Identity as 64-char hex or a label.
    #[arg(short, long)]
    identity: String,

    /// Secret as decimal or 64-char hex. A random one is drawn if omitted.
    #[arg(short, long)]
    secret: Option<String>,
}

/// One line of a replay script.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Mint {
        #[serde(deserialize_with = "label::deserialize")]
        mint: Identity,
    },
    Fund {
        fund: FundStep,
    },
    Advance {
        advance: u64,
    },
    Submit {
        #[serde(deserialize_with = "label::deserialize")]
        caller: Identity,
        #[serde(flatten)]
        op: Operation,
    },
}

#[derive(Debug, Deserialize)]
struct FundStep {
    #[serde(deserialize_with = "label::deserialize")]
    who: Identity,
    amount: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LedgerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let format = match cli.log_format.as_deref() {
        Some("json") => LogFormat::Json,
        Some("text") => LogFormat::Text,
        Some(other) => bail!("Unknown log format: {other} (expected text or json)"),
        None => config.log_format,
    };
    init_logging(&level, format);

    match cli.command {
        Commands::Replay(args) => replay(&config, args),
        Commands::Status(args) => status(&config, args),
        Commands::Price(args) => price(args),
        Commands::Commit(args) => commit(args),
    }
}

fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr; stdout carries command output.
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init(),
    }
}

fn state_file(config: &LedgerConfig, args: &StateArgs) -> StateFile {
    StateFile::new(args.state.clone().unwrap_or_else(|| config.state_path()))
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed script: {}", path.display()))
}

/// Apply one step, returning the line to print.
fn apply(ledger: &mut Ledger, step: Step) -> Result<serde_json::Value> {
    let line = match step {
        Step::Mint { mint } => {
            let asset = ledger.mint(mint)?;
            json!({ "minted": asset.0, "owner": mint })
        }
        Step::Fund { fund } => {
            ledger.fund(fund.who, fund.amount)?;
            json!({ "funded": fund.who, "amount": fund.amount, "balance": ledger.balance_of(&fund.who) })
        }
        Step::Advance { advance } => {
            ledger.advance(advance);
            json!({ "height": ledger.height(), "tip": ledger.tip() })
        }
        Step::Submit { caller, op } => {
            let height = ledger.height();
            match ledger.submit(caller, op) {
                Ok(receipt) => json!({ "ok": receipt }),
                Err(e) => json!({
                    "height": height,
                    "caller": caller,
                    "error": e.to_string(),
                    "kind": format!("{:?}", e.kind()),
                }),
            }
        }
    };
    Ok(line)
}

fn replay(config: &LedgerConfig, args: ReplayArgs) -> Result<()> {
    let steps = load_script(&args.script)?;
    let file = state_file(config, &args.state);
    let mut ledger = file
        .load_or_genesis(config)
        .with_context(|| format!("Failed to open state: {}", file.path().display()))?;

    let start = ledger.height();
    let total = steps.len();
    for step in steps {
        let line = apply(&mut ledger, step)?;
        println!("{line}");
    }
    info!(steps = total, from = start, to = ledger.height(), "replay finished");

    if !args.dry_run {
        file.save(ledger.state())
            .with_context(|| format!("Failed to save state: {}", file.path().display()))?;
    }
    Ok(())
}

fn status(config: &LedgerConfig, args: StateArgs) -> Result<()> {
    let file = state_file(config, &args);
    let ledger = file.load_or_genesis(config)?;
    let lottery = ledger.lottery();
    let round = lottery.round();
    let auctions: Vec<_> = ledger
        .auctions()
        .auctions()
        .map(|(asset, a)| {
            json!({
                "asset": asset.0,
                "seller": a.seller,
                "price": a.price_at(ledger.height()),
                "ends_at": a.ends_at(),
                "gen0": a.gen0,
            })
        })
        .collect();

    let report = json!({
        "height": ledger.height(),
        "tip": ledger.tip(),
        "paused": ledger.auctions().is_paused(),
        "auctions": auctions,
        "gen0_created": ledger.auctions().gen0_created_count(),
        "next_gen0_price": ledger.auctions().next_gen0_price(),
        "lottery": {
            "lottery_id": lottery.lottery_id(),
            "phase": format!("{:?}", lottery.phase(ledger.height())),
            "commit_closes": round.commit_closes(),
            "reveal_closes": round.reveal_closes(),
            "entries": round.entries(),
            "players": round.players(),
            "pot": round.pot(),
            "winner": round.winner(),
        },
        "draw": {
            "lottery_id": ledger.draw().lottery_id(),
            "players": ledger.draw().players(),
            "pot": ledger.draw().pot(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn price(args: PriceArgs) -> Result<()> {
    if args.duration == 0 {
        bail!("Duration must be positive");
    }
    println!("{}", current_price(args.start, args.end, args.duration, args.elapsed));
    Ok(())
}

fn commit(args: CommitArgs) -> Result<()> {
    let identity = parse_identity(&args.identity);
    let secret = match args.secret {
        Some(s) => s.parse::<Secret>().context("Secret must be decimal or 64-char hex")?,
        None => Secret::random(),
    };
    let commitment = commitment_hash(&identity, &secret);
    println!(
        "{}",
        json!({ "identity": identity, "secret": secret, "commitment": commitment })
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clockwork_core::types::AssetId;

    fn steps(json: &str) -> Vec<Step> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn script_steps_parse() {
        let parsed = steps(
            r#"[
                {"mint": "alice"},
                {"fund": {"who": "bob", "amount": 500}},
                {"advance": 2},
                {"caller": "alice", "op": "create_auction", "asset": 1,
                 "starting_price": 100, "ending_price": 0, "duration": 10}
            ]"#,
        );
        assert!(matches!(parsed[0], Step::Mint { mint } if mint == Identity::derive("alice")));
        assert!(matches!(parsed[1], Step::Fund { ref fund } if fund.amount == 500));
        assert!(matches!(parsed[2], Step::Advance { advance: 2 }));
        match &parsed[3] {
            Step::Submit { caller, op } => {
                assert_eq!(*caller, Identity::derive("alice"));
                assert_eq!(
                    *op,
                    Operation::CreateAuction { asset: AssetId(1), starting_price: 100, ending_price: 0, duration: 10 }
                );
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn reverted_step_reports_kind() {
        let mut ledger = Ledger::new(&LedgerConfig::default()).unwrap();
        let step = steps(r#"[{"caller": "bob", "op": "cancel_auction", "asset": 9}]"#).remove(0);
        let line = apply(&mut ledger, step).unwrap();
        assert_eq!(line["kind"], "NotFound");
        assert_eq!(line["height"], 0);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn replay_saves_state() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.json");
        let state = dir.path().join("state.json");
        std::fs::write(
            &script,
            r#"[
                {"mint": "alice"},
                {"caller": "alice", "op": "create_auction", "asset": 1,
                 "starting_price": 100, "ending_price": 0, "duration": 10}
            ]"#,
        )
        .unwrap();

        let config = LedgerConfig::default();
        replay(
            &config,
            ReplayArgs { script, state: StateArgs { state: Some(state.clone()) }, dry_run: false },
        )
        .unwrap();

        let ledger = StateFile::new(&state).load_or_genesis(&config).unwrap();
        assert_eq!(ledger.height(), 1);
        assert!(ledger.auction(AssetId(1)).is_some());
    }
}
