use qrmark_canonical::{GroupId, Points, QrmarkId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Typed claims carried by a verified ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionClaims {
    /// The scanned qrmark instance.
    pub qrmark_id: QrmarkId,
    /// Sponsoring company or group.
    pub group_id: GroupId,
    /// Points granted on redemption.
    pub points: Points,
}

impl RedemptionClaims {
    /// Binds the claims to the authenticated requester.
    pub fn into_request(self, requester: UserId) -> RedemptionRequest {
        RedemptionRequest {
            qrmark_id: self.qrmark_id,
            user_id: requester,
            group_id: self.group_id,
            points: self.points,
        }
    }
}

/// A redemption attempt ready for a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    /// The scanned qrmark instance.
    pub qrmark_id: QrmarkId,
    /// Requester from the authenticated session.
    pub user_id: UserId,
    /// Sponsoring company or group.
    pub group_id: GroupId,
    /// Points granted on redemption.
    pub points: Points,
}

impl RedemptionRequest {
    /// Uniqueness key of this request.
    pub fn key(&self) -> RedemptionKey {
        RedemptionKey {
            qrmark_id: self.qrmark_id,
            user_id: self.user_id,
        }
    }

    /// Materializes the record committed for this request.
    pub fn into_record(self, committed_at: Timestamp) -> RedemptionRecord {
        RedemptionRecord {
            qrmark_id: self.qrmark_id,
            user_id: self.user_id,
            group_id: self.group_id,
            points: self.points,
            committed_at,
        }
    }
}

/// Uniqueness key of a redemption: one record per qrmark per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RedemptionKey {
    /// The scanned qrmark instance.
    pub qrmark_id: QrmarkId,
    /// The redeeming user.
    pub user_id: UserId,
}

/// Append-only fact recording one committed redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    /// The scanned qrmark instance.
    pub qrmark_id: QrmarkId,
    /// The redeeming user.
    pub user_id: UserId,
    /// Sponsoring company or group.
    pub group_id: GroupId,
    /// Points granted, exactly as verified in the ticket.
    pub points: Points,
    /// Commit time.
    pub committed_at: Timestamp,
}

impl RedemptionRecord {
    /// Uniqueness key of this record.
    pub fn key(&self) -> RedemptionKey {
        RedemptionKey {
            qrmark_id: self.qrmark_id,
            user_id: self.user_id,
        }
    }
}

/// Result of presenting a request to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum RedemptionOutcome {
    /// A new record was inserted and balances updated.
    Committed(RedemptionRecord),
    /// A record for the same key already existed; nothing changed.
    AlreadyRedeemed(RedemptionRecord),
}

impl RedemptionOutcome {
    /// The committed record, new or pre-existing.
    pub fn record(&self) -> &RedemptionRecord {
        match self {
            RedemptionOutcome::Committed(record) | RedemptionOutcome::AlreadyRedeemed(record) => {
                record
            }
        }
    }

    /// Whether this outcome granted new points.
    pub fn is_committed(&self) -> bool {
        matches!(self, RedemptionOutcome::Committed(_))
    }

    /// Stable snake_case label.
    pub fn label(&self) -> &'static str {
        match self {
            RedemptionOutcome::Committed(_) => "committed",
            RedemptionOutcome::AlreadyRedeemed(_) => "already_redeemed",
        }
    }
}
