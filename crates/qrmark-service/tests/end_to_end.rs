use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use qrmark_canonical::{GroupId, Points, QrmarkId, SchoolId, UserId};
use qrmark_core::{ClaimError, RedemptionOutcome};
use qrmark_ledger::{LedgerReader, MemoryLedger, StaticSchoolDirectory};
use qrmark_service::{ErrorCategory, RedeemError, RedemptionService, ServiceConfig};
use qrmark_ticket::{KeyError, KeyProvider, TicketError};
use serde_json::{json, Value};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const P256_PRIVATE: &[u8] = include_bytes!("../../../testdata/keys/p256_private.pem");
const P256_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/p256_public.pem");
const ROGUE_PRIVATE: &[u8] = include_bytes!("../../../testdata/keys/rogue_p256_private.pem");
const RSA_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/rsa_public.pem");

fn sign_with(private_pem: &[u8], claims: &Value) -> String {
    let key = EncodingKey::from_ec_pem(private_pem).unwrap();
    encode(&Header::new(Algorithm::ES256), claims, &key).unwrap()
}

fn sign(claims: &Value) -> String {
    sign_with(P256_PRIVATE, claims)
}

fn directory() -> StaticSchoolDirectory {
    vec![(SchoolId::new(1), vec![UserId::new(42), UserId::new(99)])]
        .into_iter()
        .collect()
}

fn service_with_ledger() -> (RedemptionService, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    let service = RedemptionService::new(
        KeyProvider::from_pem(P256_PUBLIC),
        Arc::clone(&ledger),
        Arc::new(directory()),
    );
    (service, ledger)
}

fn service() -> RedemptionService {
    service_with_ledger().0
}

#[test]
fn test_redeem_once_per_user() {
    let service = service();
    let ticket = sign(&json!({"sub": 5, "num": 7, "point": 10}));

    let first = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap();
    let RedemptionOutcome::Committed(record) = &first else {
        panic!("expected commit, got {:?}", first);
    };
    assert_eq!(record.qrmark_id, QrmarkId::new(5));
    assert_eq!(record.group_id, GroupId::new(7));
    assert_eq!(record.user_id, UserId::new(42));
    assert_eq!(service.get_user_total_points(UserId::new(42)).unwrap(), Points::new(10));

    let second = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap();
    assert_eq!(second, RedemptionOutcome::AlreadyRedeemed(record.clone()));
    assert_eq!(service.get_user_total_points(UserId::new(42)).unwrap(), Points::new(10));

    let other = service.verify_and_redeem(&ticket, UserId::new(99)).unwrap();
    assert!(other.is_committed());
    assert_eq!(service.get_user_total_points(UserId::new(99)).unwrap(), Points::new(10));
    assert_eq!(service.get_user_total_points(UserId::new(42)).unwrap(), Points::new(10));
}

#[test]
fn test_unknown_user_total_is_zero() {
    let service = service();
    assert_eq!(service.get_user_total_points(UserId::new(12345)).unwrap(), Points::ZERO);
    assert_eq!(service.get_school_total_points(SchoolId::new(77)).unwrap(), Points::ZERO);
}

#[test]
fn test_school_total_sums_members() {
    let service = service();
    service
        .verify_and_redeem(&sign(&json!({"sub": 5, "num": 7, "point": 10})), UserId::new(42))
        .unwrap();
    service
        .verify_and_redeem(&sign(&json!({"sub": 6, "num": 7, "point": 3})), UserId::new(99))
        .unwrap();
    service
        .verify_and_redeem(&sign(&json!({"sub": 6, "num": 7, "point": 3})), UserId::new(500))
        .unwrap();

    assert_eq!(service.get_school_total_points(SchoolId::new(1)).unwrap(), Points::new(13));
}

#[test]
fn test_forged_ticket_never_reaches_ledger() {
    let (service, ledger) = service_with_ledger();
    let forged = sign_with(ROGUE_PRIVATE, &json!({"sub": 5, "num": 7, "point": 10}));

    let err = service.verify_and_redeem(&forged, UserId::new(42)).unwrap_err();
    assert!(matches!(err, RedeemError::Ticket(TicketError::SignatureInvalid)));
    assert_eq!(err.reason_code(), "ticket_signature_invalid");
    assert_eq!(err.public_message(), "invalid ticket");
    assert!(ledger.is_empty().unwrap());
}

#[test]
fn test_missing_point_claim_never_reaches_ledger() {
    let (service, ledger) = service_with_ledger();
    let ticket = sign(&json!({"sub": 5, "num": 7}));

    let err = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap_err();
    assert!(matches!(err, RedeemError::Claim(ClaimError::Missing("point"))));
    assert_eq!(err.category(), ErrorCategory::SuspiciousClaims);
    assert!(ledger.is_empty().unwrap());
}

#[test]
fn test_negative_points_never_reach_ledger() {
    let (service, ledger) = service_with_ledger();
    let ticket = sign(&json!({"sub": 5, "num": 7, "point": -10}));

    let err = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap_err();
    assert_eq!(err.reason_code(), "claim_invalid_value");
    assert!(!err.is_retryable());
    assert!(ledger.is_empty().unwrap());
    assert_eq!(service.get_user_total_points(UserId::new(42)).unwrap(), Points::ZERO);
}

#[test]
fn test_string_claim_rejected() {
    let service = service();
    let ticket = sign(&json!({"sub": "5", "num": 7, "point": 10}));
    let err = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap_err();
    assert_eq!(err.reason_code(), "claim_type_invalid");
}

#[test]
fn test_float_encoded_integers_accepted() {
    let service = service();
    let ticket = sign(&json!({"sub": 5.0, "num": 7.0, "point": 10.0}));
    let outcome = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap();
    assert_eq!(outcome.record().points, Points::new(10));
}

#[test]
fn test_wrong_key_type_is_operational() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = RedemptionService::new(
        KeyProvider::from_pem(RSA_PUBLIC),
        Arc::clone(&ledger),
        Arc::new(StaticSchoolDirectory::new()),
    );
    let ticket = sign(&json!({"sub": 5, "num": 7, "point": 10}));

    let err = service.verify_and_redeem(&ticket, UserId::new(42)).unwrap_err();
    assert!(matches!(err, RedeemError::Key(KeyError::WrongType(_))));
    assert_eq!(err.category(), ErrorCategory::Operational);
    assert!(ledger.is_empty().unwrap());
}

#[test]
fn test_concurrent_redemptions_commit_once() {
    const THREADS: usize = 12;
    let (service, ledger) = service_with_ledger();
    let ticket = sign(&json!({"sub": 5, "num": 7, "point": 10}));
    let barrier = Barrier::new(THREADS);

    let committed = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    service.verify_and_redeem(&ticket, UserId::new(42)).unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(RedemptionOutcome::is_committed)
            .count()
    });

    assert_eq!(committed, 1);
    assert_eq!(ledger.len().unwrap(), 1);
    assert_eq!(service.get_user_total_points(UserId::new(42)).unwrap(), Points::new(10));
}

#[test]
fn test_listing_newest_first() {
    let service = service().with_page_size(2);
    for qrmark in 1..=3 {
        let ticket = sign(&json!({"sub": qrmark, "num": 7, "point": 1}));
        service.verify_and_redeem(&ticket, UserId::new(42)).unwrap();
    }

    let page = service.list_redemptions(Some(UserId::new(42)), 1).unwrap();
    let ids: Vec<u64> = page.records.iter().map(|r| r.qrmark_id.get()).collect();
    assert_eq!(ids, vec![3, 2]);
    assert!(page.has_next);

    let err = service.list_redemptions(None, 0).unwrap_err();
    assert_eq!(err.reason_code(), "invalid_page");
}

#[test]
fn test_from_config_with_journal_persists() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("key.pem"), P256_PUBLIC).unwrap();
    let config_path = dir.path().join("qrmark.toml");
    std::fs::write(
        &config_path,
        "key_path = \"key.pem\"\njournal_path = \"redemptions.qrj\"\n\n[[schools]]\nid = 1\nmembers = [42]\n",
    )
    .unwrap();
    let config = ServiceConfig::from_file(&config_path).unwrap();
    let ticket = sign(&json!({"sub": 5, "num": 7, "point": 10}));

    {
        let service = RedemptionService::from_config(&config).unwrap();
        assert!(service.verify_and_redeem(&ticket, UserId::new(42)).unwrap().is_committed());
    }

    let service = RedemptionService::from_config(&config).unwrap();
    assert!(!service.verify_and_redeem(&ticket, UserId::new(42)).unwrap().is_committed());
    assert_eq!(service.get_school_total_points(SchoolId::new(1)).unwrap(), Points::new(10));
}
