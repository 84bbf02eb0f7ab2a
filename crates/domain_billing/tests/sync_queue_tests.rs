//! Integration tests for the offline payment sync queue

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use core_kernel::{DomainPort, KeyValueStore, PolicyNo, PortError, ProjectCode, TransactionNo};
use domain_billing::{
    ConfirmationReceipt, EnqueueOutcome, PaymentConfirmationPort, PaymentMethod,
    PaymentSyncService, PendingPayments, QueuedPayment, ReplayOutcome, SubmissionStatus,
    SyncError, SyncTrigger, SYNC_PAYMENTS_KEY,
};
use infra_store::InMemoryStore;
use test_utils::{queued_payment_strategy, QueuedPaymentBuilder};

fn payment(tx: &str) -> QueuedPayment {
    QueuedPayment::new(
        TransactionNo::new(tx).unwrap(),
        PolicyNo::new("P-2024-0001").unwrap(),
        ProjectCode::new("ABA").unwrap(),
        dec!(2720),
        PaymentMethod::Bkash,
        "SC01",
    )
    .recorded_at(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
}

fn tx(value: &str) -> TransactionNo {
    TransactionNo::new(value).unwrap()
}

/// Backend double: rejects listed transactions, confirms the rest
#[derive(Default)]
struct Backend {
    unreachable: Mutex<HashSet<String>>,
    rejected: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl Backend {
    fn unreachable_for(self, tx: &str) -> Self {
        self.unreachable.lock().unwrap().insert(tx.to_string());
        self
    }

    fn rejecting(self, tx: &str) -> Self {
        self.rejected.lock().unwrap().insert(tx.to_string());
        self
    }

    fn recover(&self, tx: &str) {
        self.unreachable.lock().unwrap().remove(tx);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DomainPort for Backend {}

#[async_trait]
impl PaymentConfirmationPort for Backend {
    async fn confirm_payment(&self, payment: &QueuedPayment) -> Result<ConfirmationReceipt, PortError> {
        let tx = payment.transaction_no.to_string();
        self.calls.lock().unwrap().push(tx.clone());

        if self.unreachable.lock().unwrap().contains(&tx) {
            return Err(PortError::connection("connection refused"));
        }
        if self.rejected.lock().unwrap().contains(&tx) {
            return Err(PortError::validation("policy not payable"));
        }
        Ok(ConfirmationReceipt {
            message: "Payment Successful".to_string(),
        })
    }
}

/// Store whose writes can be switched off
#[derive(Default)]
struct ReadOnlyAfterSeed {
    inner: InMemoryStore,
    read_only: AtomicBool,
}

impl DomainPort for ReadOnlyAfterSeed {}

#[async_trait]
impl KeyValueStore for ReadOnlyAfterSeed {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(PortError::internal("storage is read-only"));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), PortError> {
        self.inner.remove(key).await
    }
}

fn service(backend: Backend) -> (PaymentSyncService<Arc<InMemoryStore>, Arc<Backend>>, Arc<InMemoryStore>, Arc<Backend>) {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(backend);
    let sync = PaymentSyncService::new(PendingPayments::new(store.clone()), backend.clone());
    (sync, store, backend)
}

mod queue_tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_then_list_contains_entry_once() {
        let queue = PendingPayments::new(InMemoryStore::new());

        assert_eq!(queue.enqueue(payment("T1")).await.unwrap(), EnqueueOutcome::Added);
        let pending = queue.list_pending().await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], payment("T1"));
    }

    #[tokio::test]
    async fn test_duplicate_transaction_replaces_in_place() {
        let queue = PendingPayments::new(InMemoryStore::new());
        queue.enqueue(payment("T1")).await.unwrap();
        queue.enqueue(payment("T2")).await.unwrap();

        let mut updated = payment("T1");
        updated.amount = dec!(3000);
        assert_eq!(queue.enqueue(updated).await.unwrap(), EnqueueOutcome::Replaced);

        let pending = queue.list_pending().await.unwrap();
        let order: Vec<&str> = pending.iter().map(|p| p.transaction_no.as_str()).collect();
        assert_eq!(order, vec!["T1", "T2"]);
        assert_eq!(pending[0].amount, dec!(3000));
    }

    #[tokio::test]
    async fn test_stored_under_sync_payments_key_as_json_array() {
        let store = Arc::new(InMemoryStore::new());
        let queue = PendingPayments::new(store.clone());
        queue.enqueue(payment("T1")).await.unwrap();

        let raw = store.snapshot(SYNC_PAYMENTS_KEY).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["transaction_no"], "T1");
        assert_eq!(value[0]["policy_no"], "P-2024-0001");
    }

    #[tokio::test]
    async fn test_blank_stored_value_is_empty_queue() {
        let queue = PendingPayments::new(InMemoryStore::with_entries([(SYNC_PAYMENTS_KEY, "  ")]));
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_stored_value_is_untouched() {
        let store = Arc::new(InMemoryStore::with_entries([(SYNC_PAYMENTS_KEY, "{not json")]));
        let queue = PendingPayments::new(store.clone());

        assert!(matches!(queue.list_pending().await, Err(SyncError::Corrupt { .. })));
        assert!(matches!(queue.enqueue(payment("T1")).await, Err(SyncError::Corrupt { .. })));
        assert_eq!(store.snapshot(SYNC_PAYMENTS_KEY).await.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_remove_unknown_does_not_write() {
        let store = Arc::new(InMemoryStore::new());
        let queue = PendingPayments::new(store.clone());

        assert!(!queue.remove(&tx("T9")).await.unwrap());
        assert_eq!(store.snapshot(SYNC_PAYMENTS_KEY).await, None);
    }

    #[tokio::test]
    async fn test_concurrent_enqueues_are_all_kept() {
        let queue = Arc::new(PendingPayments::new(InMemoryStore::new()));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.enqueue(payment(&format!("T{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(queue.len().await.unwrap(), 10);
    }
}

mod replay_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_succeeds_second_fails_leaves_second() {
        let (sync, _, _) = service(Backend::default().unreachable_for("T2"));
        sync.queue().enqueue(payment("T1")).await.unwrap();
        sync.queue().enqueue(payment("T2")).await.unwrap();

        let report = sync.replay_all(SyncTrigger::AppStart).await.unwrap();

        let remaining = sync.queue().list_pending().await.unwrap();
        assert_eq!(remaining, vec![payment("T2")]);
        assert_eq!(report.confirmed, vec![tx("T1")]);
        assert_eq!(report.deferred, vec![tx("T2")]);
        assert!(report.rejected.is_empty());
        assert!(report.needs_deferred_notice());
    }

    #[tokio::test]
    async fn test_failure_leaves_stored_bytes_unchanged() {
        let (sync, store, _) = service(Backend::default().unreachable_for("T1"));
        sync.queue().enqueue(payment("T1")).await.unwrap();
        let before = store.snapshot(SYNC_PAYMENTS_KEY).await;

        let outcome = sync.replay(&payment("T1")).await.unwrap();

        assert!(matches!(outcome, ReplayOutcome::Deferred { transient: true, .. }));
        assert_eq!(store.snapshot(SYNC_PAYMENTS_KEY).await, before);
    }

    #[tokio::test]
    async fn test_success_removes_only_that_entry() {
        let (sync, _, _) = service(Backend::default());
        for id in ["T1", "T2", "T3"] {
            sync.queue().enqueue(payment(id)).await.unwrap();
        }

        let outcome = sync.replay(&payment("T2")).await.unwrap();
        assert!(matches!(outcome, ReplayOutcome::Confirmed(_)));

        let remaining: Vec<String> = sync
            .queue()
            .list_pending()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.transaction_no.to_string())
            .collect();
        assert_eq!(remaining, vec!["T1", "T3"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_later_entries() {
        let (sync, _, backend) = service(Backend::default().unreachable_for("T1"));
        for id in ["T1", "T2", "T3"] {
            sync.queue().enqueue(payment(id)).await.unwrap();
        }

        let report = sync.replay_all(SyncTrigger::Manual).await.unwrap();

        assert_eq!(backend.calls(), vec!["T1", "T2", "T3"]);
        assert_eq!(report.confirmed, vec![tx("T2"), tx("T3")]);
        assert_eq!(report.attempted(), 3);
    }

    #[tokio::test]
    async fn test_rejected_entries_are_reported_separately() {
        let (sync, _, _) = service(Backend::default().rejecting("T1").unreachable_for("T2"));
        sync.queue().enqueue(payment("T1")).await.unwrap();
        sync.queue().enqueue(payment("T2")).await.unwrap();

        let report = sync.replay_all(SyncTrigger::Manual).await.unwrap();

        assert_eq!(report.deferred, vec![tx("T1"), tx("T2")]);
        assert_eq!(report.rejected, vec![tx("T1")]);
        assert_eq!(sync.queue().len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_next_pass_confirms_recovered_entry() {
        let (sync, _, backend) = service(Backend::default().unreachable_for("T1"));
        sync.queue().enqueue(payment("T1")).await.unwrap();

        let first = sync.replay_all(SyncTrigger::AppStart).await.unwrap();
        assert!(first.needs_deferred_notice());

        backend.recover("T1");
        let second = sync.replay_all(SyncTrigger::Manual).await.unwrap();
        assert!(second.is_clean());
        assert!(!second.needs_deferred_notice());
        assert!(sync.queue().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_queue_reports_nothing() {
        let (sync, _, backend) = service(Backend::default());
        let report = sync.replay_all(SyncTrigger::AppStart).await.unwrap();

        assert_eq!(report.attempted(), 0);
        assert!(backend.calls().is_empty());
        assert!(!report.needs_deferred_notice());
    }

    #[tokio::test]
    async fn test_removal_failure_after_confirmation() {
        let store = Arc::new(ReadOnlyAfterSeed::default());
        let sync = PaymentSyncService::new(PendingPayments::new(store.clone()), Backend::default());
        sync.queue().enqueue(payment("T1")).await.unwrap();
        store.read_only.store(true, Ordering::SeqCst);

        let err = sync.replay(&payment("T1")).await.unwrap_err();
        assert!(matches!(err, SyncError::RemovalFailed { .. }));

        let report = sync.replay_all(SyncTrigger::Manual).await.unwrap();
        assert_eq!(report.removal_failed, vec![tx("T1")]);
        assert_eq!(sync.queue().len().await.unwrap(), 1);
    }
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_confirmed_submission_skips_queue() {
        let (sync, store, _) = service(Backend::default());

        let status = sync.submit(payment("T1")).await.unwrap();

        assert_eq!(
            status,
            SubmissionStatus::Confirmed(ConfirmationReceipt {
                message: "Payment Successful".to_string()
            })
        );
        assert_eq!(store.snapshot(SYNC_PAYMENTS_KEY).await, None);
    }

    #[tokio::test]
    async fn test_failed_submission_is_queued_once() {
        let (sync, _, _) = service(Backend::default().unreachable_for("T1"));

        assert_eq!(sync.submit(payment("T1")).await.unwrap(), SubmissionStatus::QueuedForSync);
        assert_eq!(sync.submit(payment("T1")).await.unwrap(), SubmissionStatus::QueuedForSync);

        assert_eq!(sync.queue().list_pending().await.unwrap(), vec![payment("T1")]);
    }

    #[tokio::test]
    async fn test_local_transaction_number_round_trips() {
        let (sync, _, _) = service(Backend::default());
        let cash = QueuedPaymentBuilder::local().build();
        let local = cash.transaction_no.clone();

        sync.queue().enqueue(cash).await.unwrap();
        let pending = sync.queue().list_pending().await.unwrap();
        assert_eq!(pending[0].transaction_no, local);
        assert_eq!(pending[0].method, PaymentMethod::Cash);
        assert!(pending[0].transaction_no.is_local());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    async fn enqueue_all(payments: Vec<QueuedPayment>) -> Vec<QueuedPayment> {
        let queue = PendingPayments::new(InMemoryStore::new());
        for payment in payments {
            queue.enqueue(payment).await.unwrap();
        }
        queue.list_pending().await.unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn enqueue_never_duplicates(ids in prop::collection::vec(0u8..6, 1..20)) {
            let payments = ids
                .iter()
                .map(|id| QueuedPaymentBuilder::new(&format!("T{id}")).build())
                .collect();
            let pending = runtime().block_on(enqueue_all(payments));

            let unique: HashSet<u8> = ids.iter().copied().collect();
            prop_assert_eq!(pending.len(), unique.len());

            let mut first_seen = Vec::new();
            for id in &ids {
                if !first_seen.contains(id) {
                    first_seen.push(*id);
                }
            }
            let order: Vec<String> = pending.iter().map(|p| p.transaction_no.to_string()).collect();
            let expected: Vec<String> = first_seen.iter().map(|id| format!("T{id}")).collect();
            prop_assert_eq!(order, expected);
        }

        #[test]
        fn queued_payments_list_back_unchanged(
            payments in prop::collection::vec(queued_payment_strategy(), 1..8),
        ) {
            let pending = runtime().block_on(enqueue_all(payments.clone()));

            let mut expected: Vec<QueuedPayment> = Vec::new();
            for payment in payments {
                match expected.iter_mut().find(|p| p.transaction_no == payment.transaction_no) {
                    Some(existing) => *existing = payment,
                    None => expected.push(payment),
                }
            }
            prop_assert_eq!(pending, expected);
        }
    }
}
