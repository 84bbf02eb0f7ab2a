//! Policy domain services
//!
//! `PremiumService` is the entry point the application shell calls whenever a
//! quote input changes. It decides whether a project is priced from the rate
//! table and delegates the arithmetic to [`crate::premium`].

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::instrument;

use core_kernel::ProjectCode;

use crate::error::PolicyError;
use crate::premium::{compute_premium, PremiumQuoteRequest, PremiumQuoteResult, QuoteDraft};
use crate::rating::RateLookup;

/// Service for quoting first premiums
///
/// # Example
///
/// ```rust,ignore
/// let service = PremiumService::new(rate_lookup)
///     .with_special_projects([ProjectCode::new("ABA")?]);
///
/// match service.quote(&draft, today).await? {
///     None => {} // form still incomplete
///     Some(result) if result.rate.is_not_found() => show_rate_not_found(),
///     Some(result) => show(result),
/// }
/// ```
pub struct PremiumService<L> {
    rate_lookup: L,
    special_projects: HashSet<ProjectCode>,
}

impl<L: RateLookup> PremiumService<L> {
    /// Creates a service where every project is priced flat
    pub fn new(rate_lookup: L) -> Self {
        Self {
            rate_lookup,
            special_projects: HashSet::new(),
        }
    }

    /// Marks projects that price from the rate table
    pub fn with_special_projects(mut self, projects: impl IntoIterator<Item = ProjectCode>) -> Self {
        self.special_projects.extend(projects);
        self
    }

    pub fn is_special_project(&self, project_code: &ProjectCode) -> bool {
        self.special_projects.contains(project_code)
    }

    pub fn rate_lookup(&self) -> &L {
        &self.rate_lookup
    }

    /// Quotes a draft
    ///
    /// # Returns
    ///
    /// `Ok(None)` while the draft is incomplete, otherwise the quote. A failed
    /// rate lookup is a quote with the not-found rate.
    ///
    /// # Errors
    ///
    /// Malformed field values, ages outside 0..=99 and sums assured too
    /// large to price.
    #[instrument(skip(self, draft), fields(project_code = ?draft.project_code, plan_code = ?draft.plan_code))]
    pub async fn quote(
        &self,
        draft: &QuoteDraft,
        today: NaiveDate,
    ) -> Result<Option<PremiumQuoteResult>, PolicyError> {
        match draft.complete()? {
            Some(request) => self.quote_request(&request, today).await.map(Some),
            None => Ok(None),
        }
    }

    /// Quotes a draft for a first-premium submission, which additionally
    /// requires an adult policyholder
    #[instrument(skip(self, draft))]
    pub async fn quote_for_submission(
        &self,
        draft: &QuoteDraft,
        today: NaiveDate,
    ) -> Result<Option<PremiumQuoteResult>, PolicyError> {
        let Some(request) = draft.complete()? else {
            return Ok(None);
        };
        request.ensure_submission_age(today)?;
        self.quote_request(&request, today).await.map(Some)
    }

    /// Quotes a validated request
    pub async fn quote_request(
        &self,
        request: &PremiumQuoteRequest,
        today: NaiveDate,
    ) -> Result<PremiumQuoteResult, PolicyError> {
        let special = self.is_special_project(&request.project_code);
        let result = compute_premium(request, special, &self.rate_lookup, today).await?;

        tracing::debug!(
            rate_code = %result.rate_code,
            special,
            not_found = result.rate.is_not_found(),
            "Quote computed"
        );
        Ok(result)
    }
}
