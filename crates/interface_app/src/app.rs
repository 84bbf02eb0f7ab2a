//! The premium desk facade
//!
//! One object per running app: it quotes premiums as the form changes and
//! takes gateway-settled payments through confirmation or the offline queue.
//! Every call returns its own status value; there is no shared loading flag.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use core_kernel::{KeyValueStore, Timezone};
use domain_billing::{
    PaymentConfirmationPort, PaymentSyncService, PendingPayments, QueuedPayment,
    SubmissionStatus, SyncReport, SyncTrigger,
};
use domain_policy::{PremiumQuoteResult, PremiumService, QuoteDraft, RateLookup};
use infra_http::{ApiClient, HttpPaymentConfirmation, HttpRateLookup};
use infra_store::FileStore;

use crate::config::AppConfig;
use crate::error::AppError;

/// Desk wired to the policy backend and the file store
pub type HttpPremiumDesk = PremiumDesk<HttpRateLookup, FileStore, HttpPaymentConfirmation>;

/// Premium quoting plus durable payment confirmation
pub struct PremiumDesk<L, S, C> {
    premium: PremiumService<L>,
    sync: PaymentSyncService<S, C>,
    timezone: Timezone,
}

impl<L, S, C> PremiumDesk<L, S, C>
where
    L: RateLookup,
    S: KeyValueStore,
    C: PaymentConfirmationPort,
{
    pub fn new(premium: PremiumService<L>, sync: PaymentSyncService<S, C>, timezone: Timezone) -> Self {
        Self {
            premium,
            sync,
            timezone,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Quotes a draft against today's local date
    ///
    /// `Ok(None)` while the draft is incomplete.
    pub async fn quote(&self, draft: &QuoteDraft) -> Result<Option<PremiumQuoteResult>, AppError> {
        self.quote_on(draft, self.timezone.today()).await
    }

    pub async fn quote_on(
        &self,
        draft: &QuoteDraft,
        today: NaiveDate,
    ) -> Result<Option<PremiumQuoteResult>, AppError> {
        Ok(self.premium.quote(draft, today).await?)
    }

    /// Quotes a draft for first-premium submission, which requires an adult
    pub async fn quote_for_submission(
        &self,
        draft: &QuoteDraft,
    ) -> Result<Option<PremiumQuoteResult>, AppError> {
        Ok(self
            .premium
            .quote_for_submission(draft, self.timezone.today())
            .await?)
    }

    /// Confirms a gateway-settled payment, queueing it when confirmation fails
    pub async fn submit_payment(&self, payment: QueuedPayment) -> Result<SubmissionStatus, AppError> {
        Ok(self.sync.submit(payment).await?)
    }

    /// Replays the queue once at start-up
    #[instrument(skip(self))]
    pub async fn sync_on_start(&self) -> Result<SyncReport, AppError> {
        self.replay(SyncTrigger::AppStart).await
    }

    /// Replays the queue on user request
    #[instrument(skip(self))]
    pub async fn sync_now(&self) -> Result<SyncReport, AppError> {
        self.replay(SyncTrigger::Manual).await
    }

    pub async fn pending_payments(&self) -> Result<Vec<QueuedPayment>, AppError> {
        Ok(self.sync.queue().list_pending().await?)
    }

    async fn replay(&self, trigger: SyncTrigger) -> Result<SyncReport, AppError> {
        let report = self.sync.replay_all(trigger).await?;
        if report.needs_deferred_notice() {
            warn!(deferred = report.deferred.len(), "Some payments will be synced later");
        }
        Ok(report)
    }
}

impl HttpPremiumDesk {
    /// Builds the production desk from configuration
    ///
    /// Opens (and creates) the storage directory; no network calls are made.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let client = ApiClient::new(config.api_client_config())?;
        let store = FileStore::open(config.store_config()).await?;
        let special_projects = config.special_project_codes();

        info!(
            base_url = %client.base_url(),
            storage_dir = %store.root().display(),
            special_projects = special_projects.len(),
            "Premium desk configured"
        );

        let premium = PremiumService::new(HttpRateLookup::new(client.clone()))
            .with_special_projects(special_projects);
        let sync = PaymentSyncService::new(
            PendingPayments::new(store),
            HttpPaymentConfirmation::new(client),
        );

        Ok(Self::new(premium, sync, config.timezone()?))
    }
}
