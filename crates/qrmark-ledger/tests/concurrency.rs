use qrmark_canonical::{GroupId, Points, QrmarkId, UserId};
use qrmark_core::RedemptionRequest;
use qrmark_journal::{audit_journal, ReadMode};
use qrmark_ledger::{JournalLedger, LedgerReader, MemoryLedger, RedemptionLedger};
use std::sync::Barrier;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 16;

fn request(qrmark: u64, user: u64, points: u64) -> RedemptionRequest {
    RedemptionRequest {
        qrmark_id: QrmarkId::new(qrmark),
        user_id: UserId::new(user),
        group_id: GroupId::new(7),
        points: Points::new(points),
    }
}

/// Races `THREADS` identical redemptions and returns how many committed.
fn race_same_key<L: RedemptionLedger>(ledger: &L) -> usize {
    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    ledger.redeem(&request(5, 42, 10)).unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|outcome| outcome.is_committed())
            .count()
    })
}

#[test]
fn test_memory_ledger_single_winner() {
    let ledger = MemoryLedger::new();
    assert_eq!(race_same_key(&ledger), 1);
    assert_eq!(ledger.len().unwrap(), 1);
    assert_eq!(ledger.user_total(UserId::new(42)).unwrap(), Points::new(10));
}

#[test]
fn test_journal_ledger_single_winner() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("race.qrj");
    {
        let ledger = JournalLedger::open_default(&path).unwrap();
        assert_eq!(race_same_key(&ledger), 1);
        assert_eq!(ledger.user_total(UserId::new(42)).unwrap(), Points::new(10));
    }

    let audit = audit_journal(&path, ReadMode::Strict).unwrap();
    assert_eq!(audit.records, 1);
    assert!(audit.is_clean());
}

#[test]
fn test_distinct_keys_all_commit() {
    let ledger = MemoryLedger::new();
    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        for user in 0..THREADS as u64 {
            let ledger = &ledger;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for qrmark in 0..8 {
                    assert!(ledger.redeem(&request(qrmark, user, 1)).unwrap().is_committed());
                }
            });
        }
    });

    assert_eq!(ledger.len().unwrap(), THREADS * 8);
    for user in 0..THREADS as u64 {
        assert_eq!(ledger.user_total(UserId::new(user)).unwrap(), Points::new(8));
    }
}

#[test]
fn test_totals_match_records_under_contention() {
    let ledger = MemoryLedger::new();
    thread::scope(|scope| {
        for _ in 0..THREADS {
            let ledger = &ledger;
            scope.spawn(move || {
                // Every worker tries the same 4 qrmarks for the same 2 users.
                for qrmark in 0..4 {
                    for user in [1, 2] {
                        ledger.redeem(&request(qrmark, user, qrmark + 1)).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(ledger.len().unwrap(), 8);
    // 1 + 2 + 3 + 4 per user.
    assert_eq!(ledger.user_total(UserId::new(1)).unwrap(), Points::new(10));
    assert_eq!(ledger.user_total(UserId::new(2)).unwrap(), Points::new(10));
}
