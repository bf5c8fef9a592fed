use crate::config::{ConfigError, ServiceConfig};
use crate::errors::{ErrorCategory, RedeemError};
use qrmark_canonical::{Points, SchoolId, UserId};
use qrmark_core::{ClaimExtractor, RedemptionOutcome};
use qrmark_ledger::{
    AggregationQuery, JournalLedger, LedgerReader, MemoryLedger, RecordPage, RedemptionLedger,
    SchoolDirectory,
};
use qrmark_ticket::{KeyProvider, TicketVerifier};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

/// Default records per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Verifies tickets and commits redemptions against a ledger.
///
/// Stateless apart from the key cache and the ledger; safe to share across
/// threads behind an `Arc`.
pub struct RedemptionService {
    keys: KeyProvider,
    verifier: TicketVerifier,
    extractor: ClaimExtractor,
    ledger: Arc<dyn RedemptionLedger>,
    reader: Arc<dyn LedgerReader>,
    directory: Arc<dyn SchoolDirectory>,
    page_size: usize,
}

impl RedemptionService {
    /// Creates a service over `ledger` with school membership from `directory`.
    pub fn new<L, D>(keys: KeyProvider, ledger: Arc<L>, directory: Arc<D>) -> Self
    where
        L: RedemptionLedger + LedgerReader + 'static,
        D: SchoolDirectory + 'static,
    {
        Self {
            keys,
            verifier: TicketVerifier::new(),
            extractor: ClaimExtractor::new(),
            ledger: ledger.clone(),
            reader: ledger,
            directory,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Builds a service from configuration, opening the journal if one is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let keys = KeyProvider::from_path(&config.key_path);
        let directory = Arc::new(config.school_directory());

        let service = match &config.journal_path {
            Some(path) => {
                let ledger =
                    JournalLedger::open(path, config.write_options(), config.ledger_options())?;
                Self::new(keys, Arc::new(ledger), directory)
            }
            None => {
                let ledger = MemoryLedger::with_options(config.ledger_options());
                Self::new(keys, Arc::new(ledger), directory)
            }
        };

        Ok(service
            .with_verifier(TicketVerifier::with_leeway(config.leeway_secs))
            .with_page_size(config.page_size))
    }

    /// Replaces the ticket verifier.
    pub fn with_verifier(mut self, verifier: TicketVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Sets the listing page size (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Verifies `ticket` and redeems it on behalf of `requester`.
    ///
    /// `requester` must come from the caller's authenticated session; the
    /// ticket never names its redeemer. Verification and claim failures
    /// return before the ledger is touched.
    pub fn verify_and_redeem(
        &self,
        ticket: &str,
        requester: UserId,
    ) -> Result<RedemptionOutcome, RedeemError> {
        let span = info_span!(
            "redemption",
            requester = %requester,
            stage = tracing::field::Empty
        );
        let _enter = span.enter();

        let result = self.redeem_stages(ticket, requester, &span);
        match &result {
            Ok(RedemptionOutcome::Committed(record)) => info!(
                qrmark_id = %record.qrmark_id,
                group_id = %record.group_id,
                points = record.points.get(),
                "redemption committed"
            ),
            Ok(RedemptionOutcome::AlreadyRedeemed(record)) => debug!(
                qrmark_id = %record.qrmark_id,
                committed_at = %record.committed_at,
                "already redeemed"
            ),
            Err(err) => log_rejection(err),
        }
        result
    }

    fn redeem_stages(
        &self,
        ticket: &str,
        requester: UserId,
        span: &tracing::Span,
    ) -> Result<RedemptionOutcome, RedeemError> {
        span.record("stage", "verifying");
        let key = self.keys.get_verifying_key()?;
        let claims = self.verifier.verify(ticket, &key)?;

        span.record("stage", "extracting");
        let request = self
            .extractor
            .extract(claims.as_map())?
            .into_request(requester);

        span.record("stage", "committing");
        Ok(self.ledger.redeem(&request)?)
    }

    /// Total points committed to `user`; zero when there are none.
    pub fn get_user_total_points(&self, user: UserId) -> Result<Points, RedeemError> {
        Ok(self.query().total_points_for_user(user)?)
    }

    /// Total points committed to members of `school`; zero for unknown schools.
    pub fn get_school_total_points(&self, school: SchoolId) -> Result<Points, RedeemError> {
        Ok(self.query().total_points_for_school(school)?)
    }

    /// Newest-first page of records, optionally for one user. Pages start at 1.
    pub fn list_redemptions(
        &self,
        user: Option<UserId>,
        page: u32,
    ) -> Result<RecordPage, RedeemError> {
        Ok(self.query().list(user, page, self.page_size)?)
    }

    fn query(&self) -> AggregationQuery<'_> {
        AggregationQuery::new(self.reader.as_ref(), self.directory.as_ref())
    }
}

fn log_rejection(err: &RedeemError) {
    let reason = err.reason_code();
    match err.category() {
        ErrorCategory::Operational => {
            error!(reason, error = %err, "verifying key problem, redemptions are failing")
        }
        ErrorCategory::InvalidTicket => warn!(reason, error = %err, "ticket rejected"),
        ErrorCategory::SuspiciousClaims => error!(
            reason,
            suspicious = true,
            error = %err,
            "verified ticket carries unusable claims"
        ),
        ErrorCategory::Transient => warn!(reason, error = %err, "ledger unavailable"),
        ErrorCategory::InvalidRequest => debug!(reason, error = %err, "invalid request"),
    }
}
