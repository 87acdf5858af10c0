//! State file persistence against a real temporary directory.

use clockwork_core::types::Identity;
use clockwork_ledger::{LedgerConfig, Operation, StateFile, StoreError};

#[test]
fn missing_file_starts_from_genesis() {
    let dir = tempfile::tempdir().unwrap();
    let file = StateFile::new(dir.path().join("state.json"));
    assert!(!file.exists());
    let ledger = file.load_or_genesis(&LedgerConfig::default()).unwrap();
    assert_eq!(ledger.height(), 0);
}

#[test]
fn save_then_load_resumes_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let file = StateFile::new(dir.path().join("nested").join("state.json"));
    let config = LedgerConfig::default();

    let mut ledger = file.load_or_genesis(&config).unwrap();
    let alice = Identity::derive("alice");
    let asset = ledger.mint(alice).unwrap();
    ledger
        .submit(alice, Operation::CreateAuction { asset, starting_price: 100, ending_price: 10, duration: 9 })
        .unwrap();
    file.save(ledger.state()).unwrap();

    let resumed = file.load_or_genesis(&config).unwrap();
    assert_eq!(resumed.state(), ledger.state());
    assert_eq!(resumed.height(), 1);
    assert_eq!(resumed.tip(), ledger.tip());
    assert_eq!(resumed.auction(asset).unwrap().seller, alice);
    assert!(!dir.path().join("nested").join("state.json.tmp").exists());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let err = StateFile::new(&path).load().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}
