// ═══════════════════════════════════════════════════════════════════
// Storage Tests — LedgerStore, SnapshotStore container format
// ═══════════════════════════════════════════════════════════════════

use papertrade_core::errors::CoreError;
use papertrade_core::storage::ledger::LedgerStore;
use papertrade_core::storage::snapshot::SnapshotStore;

fn populated_ledger() -> LedgerStore {
    let ledger = LedgerStore::new();
    let alice = ledger
        .create_user("alice", "$argon2id$fake-hash-a".into(), 10_000.0)
        .unwrap();
    ledger
        .create_user("bob", "$argon2id$fake-hash-b".into(), 10_000.0)
        .unwrap();
    ledger
        .update(alice.id, |txn| {
            txn.record_trade("AAPL", 10, 150.0);
            Ok(txn.record_trade("AAPL", -3, 155.0))
        })
        .unwrap();
    ledger
}

// ── LedgerStore ─────────────────────────────────────────────────────

mod ledger {
    use super::*;

    #[test]
    fn rejected_update_applies_nothing() {
        let ledger = LedgerStore::new();
        let user = ledger.create_user("alice", "h".into(), 100.0).unwrap();

        let result: Result<(), CoreError> = ledger.update(user.id, |txn| {
            // Mutate first, then fail: the staged copy must be discarded.
            txn.record_trade("AAPL", 1, 50.0);
            txn.credit_cash(999.0);
            Err(CoreError::ValidationError("boom".into()))
        });
        assert!(result.is_err());

        assert_eq!(ledger.cash(user.id).unwrap(), 100.0);
        assert!(ledger.transactions(user.id).unwrap().is_empty());
    }

    #[test]
    fn record_trade_moves_cash_and_appends_row_together() {
        let ledger = LedgerStore::new();
        let user = ledger.create_user("alice", "h".into(), 1_000.0).unwrap();

        ledger
            .update(user.id, |txn| Ok(txn.record_trade("MSFT", 2, 100.0)))
            .unwrap();

        assert_eq!(ledger.cash(user.id).unwrap(), 800.0);
        let rows = ledger.transactions(user.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shares, 2);
    }

    #[test]
    fn holdings_aggregate_signed_counts_per_symbol() {
        let ledger = LedgerStore::new();
        let user = ledger.create_user("alice", "h".into(), 10_000.0).unwrap();
        ledger
            .update(user.id, |txn| {
                txn.record_trade("AAPL", 10, 1.0);
                txn.record_trade("MSFT", 4, 1.0);
                txn.record_trade("AAPL", -6, 1.0);
                txn.record_trade("NFLX", 2, 1.0);
                Ok(txn.record_trade("NFLX", -2, 1.0))
            })
            .unwrap();

        let holdings = ledger.holdings(user.id).unwrap();
        // Sorted by symbol, NFLX netted out to zero and hidden
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].shares, 4);
        assert_eq!(holdings[1].symbol, "MSFT");
        assert_eq!(holdings[1].shares, 4);

        assert_eq!(ledger.shares_held(user.id, "AAPL").unwrap(), 4);
        assert_eq!(ledger.shares_held(user.id, "NFLX").unwrap(), 0);
        assert_eq!(ledger.shares_held(user.id, "ZZZZ").unwrap(), 0);
    }

    #[test]
    fn symbols_are_stored_uppercased() {
        let ledger = LedgerStore::new();
        let user = ledger.create_user("alice", "h".into(), 1_000.0).unwrap();
        ledger
            .update(user.id, |txn| Ok(txn.record_trade("aapl", 1, 10.0)))
            .unwrap();

        assert_eq!(ledger.transactions(user.id).unwrap()[0].symbol, "AAPL");
        assert_eq!(ledger.shares_held(user.id, "aapl").unwrap(), 1);
    }

    #[test]
    fn sequence_numbers_are_strictly_increasing() {
        let ledger = populated_ledger();
        let alice = ledger.user_by_name("alice").unwrap();
        let rows = ledger.transactions(alice.id).unwrap();
        assert!(rows.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[test]
    fn unknown_user_lookups_fail() {
        let ledger = LedgerStore::new();
        let ghost = uuid::Uuid::new_v4();
        assert!(matches!(
            ledger.cash(ghost),
            Err(CoreError::UnknownUser(_))
        ));
        assert!(matches!(
            ledger.update(ghost, |_| Ok(())),
            Err(CoreError::UnknownUser(_))
        ));
    }
}

// ── SnapshotStore ───────────────────────────────────────────────────

mod snapshot {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let ledger = populated_ledger();
        let bytes = SnapshotStore::save_to_bytes(&ledger, "pass").unwrap();
        let restored = SnapshotStore::load_from_bytes(&bytes, "pass").unwrap();

        assert_eq!(restored.user_count(), 2);
        let alice = restored.user_by_name("alice").unwrap();
        assert_eq!(alice.password_hash, "$argon2id$fake-hash-a");
        assert_eq!(restored.transactions(alice.id).unwrap().len(), 2);
        assert_eq!(restored.shares_held(alice.id, "AAPL").unwrap(), 7);

        // Sequence counter must continue past restored rows
        let bob = restored.user_by_name("bob").unwrap();
        let max_seq = restored
            .transactions(alice.id)
            .unwrap()
            .iter()
            .map(|t| t.seq)
            .max()
            .unwrap();
        let row = restored
            .update(bob.id, |txn| Ok(txn.record_trade("NFLX", 1, 1.0)))
            .unwrap();
        assert!(row.seq > max_seq);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.ptsn");

        let ledger = populated_ledger();
        SnapshotStore::save_to_file(&ledger, &path, "file-pw").unwrap();
        let restored = SnapshotStore::load_from_file(&path, "file-pw").unwrap();
        assert_eq!(restored.user_count(), 2);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let ledger = populated_ledger();
        let bytes = SnapshotStore::save_to_bytes(&ledger, "correct").unwrap();
        let result = SnapshotStore::load_from_bytes(&bytes, "wrong");
        assert!(matches!(result, Err(CoreError::Decryption)));
    }

    #[test]
    fn garbage_bytes_fail_without_panicking() {
        let result = SnapshotStore::load_from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF], "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn empty_input_fails() {
        let result = SnapshotStore::load_from_bytes(&[], "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn bad_magic_fails() {
        let ledger = populated_ledger();
        let mut bytes = SnapshotStore::save_to_bytes(&ledger, "pw").unwrap();
        bytes[0] = b'X';
        let result = SnapshotStore::load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn future_version_fails() {
        let ledger = populated_ledger();
        let mut bytes = SnapshotStore::save_to_bytes(&ledger, "pw").unwrap();
        bytes[4] = 0xFF;
        bytes[5] = 0x00;
        let result = SnapshotStore::load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::UnsupportedVersion(255))));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let ledger = populated_ledger();
        let mut bytes = SnapshotStore::save_to_bytes(&ledger, "pw").unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let result = SnapshotStore::load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::Decryption)));
    }

    #[test]
    fn absurd_kdf_params_are_rejected() {
        let ledger = populated_ledger();
        let mut bytes = SnapshotStore::save_to_bytes(&ledger, "pw").unwrap();
        // memory_cost lives at offset 6..10; claim 2 GiB
        bytes[6..10].copy_from_slice(&2_097_152u32.to_le_bytes());
        let result = SnapshotStore::load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }
}
