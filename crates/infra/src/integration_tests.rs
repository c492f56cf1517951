//! Integration tests for the full request pipeline.
//!
//! Tests: Request → Dispatcher → Validator / Transition Handler → RecordStore
//!
//! Verifies:
//! - Rejected writes leave the store untouched
//! - Status defaults and the DRAFT → SUBMITTED transition
//! - Concurrent submits on one record produce exactly one success
//! - Customer emails stay out of log output

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::format::FmtSpan;

use onboarding_core::{DomainError, RecordId};
use onboarding_customers::{
    ALREADY_SUBMITTED, EMAIL_MANDATORY_IN_GERMANY, OnboardingFields, OnboardingRecord,
    OnboardingStatus, RECORD_NOT_FOUND, SubmittedReview,
};

use crate::context::RequestContext;
use crate::dispatcher::{DispatchError, OnboardingRequest, OnboardingResponse, RequestDispatcher};
use crate::record_store::InMemoryRecordStore;

type Dispatcher = RequestDispatcher<Arc<InMemoryRecordStore>>;

fn setup() -> (Arc<Dispatcher>, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::new());
    let dispatcher = Arc::new(RequestDispatcher::new(store.clone()));
    (dispatcher, store)
}

fn payload(country: Option<&str>, email: Option<&str>) -> OnboardingFields {
    OnboardingFields {
        country: country.map(|c| Some(c.to_string())),
        email: email.map(|e| Some(e.to_string())),
        status: None,
    }
}

async fn create(dispatcher: &Dispatcher, fields: OnboardingFields) -> OnboardingRecord {
    match dispatcher
        .dispatch(&RequestContext::new(), OnboardingRequest::Create(fields))
        .await
        .unwrap()
    {
        OnboardingResponse::Record(record) => record,
        other => panic!("expected a record, got {other:?}"),
    }
}

async fn submit(dispatcher: &Dispatcher, id: RecordId) -> Result<SubmittedReview, DomainError> {
    match dispatcher
        .dispatch(&RequestContext::new(), OnboardingRequest::SubmitForReview { id })
        .await
    {
        Ok(OnboardingResponse::Submitted(review)) => Ok(review),
        Ok(other) => panic!("expected a submitted review, got {other:?}"),
        Err(DispatchError::Domain(e)) => Err(e),
        Err(DispatchError::Store(e)) => panic!("unexpected store error: {e}"),
    }
}

#[tokio::test]
async fn german_customer_with_empty_email_is_rejected_and_nothing_is_stored() {
    let (dispatcher, store) = setup();

    let err = dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Create(payload(Some("DE"), Some(""))),
        )
        .await
        .unwrap_err();

    match err {
        DispatchError::Domain(e) => {
            assert_eq!(e.status_code(), 400);
            assert_eq!(e.message(), EMAIL_MANDATORY_IN_GERMANY);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn french_customer_without_email_is_accepted_as_draft() {
    let (dispatcher, store) = setup();

    let record = create(&dispatcher, payload(Some("FR"), None)).await;

    assert_eq!(record.status(), OnboardingStatus::Draft);
    assert_eq!(record.email(), None);
    assert_eq!(store.snapshot().await, vec![record]);
}

#[tokio::test]
async fn draft_is_submitted_once_then_rejected() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("DE"), Some("a@b.com"))).await;
    let id = record.record_id();

    let review = submit(&dispatcher, id).await.unwrap();
    assert_eq!(review.id, id);
    assert_eq!(review.status, OnboardingStatus::Submitted);

    let after_first = store.snapshot().await;
    assert_eq!(after_first[0].status(), OnboardingStatus::Submitted);

    let err = submit(&dispatcher, id).await.unwrap_err();
    assert_eq!(err, DomainError::Conflict(ALREADY_SUBMITTED.to_string()));
    assert_eq!(err.status_code(), 400);

    assert_eq!(store.snapshot().await, after_first);
}

#[tokio::test]
async fn submit_of_unknown_id_is_not_found() {
    let (dispatcher, store) = setup();

    let err = submit(&dispatcher, RecordId::new()).await.unwrap_err();

    assert_eq!(err, DomainError::NotFound(RECORD_NOT_FOUND.to_string()));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn record_created_as_submitted_cannot_be_submitted_again() {
    let (dispatcher, _store) = setup();
    let fields = OnboardingFields {
        status: Some(OnboardingStatus::Submitted),
        ..payload(Some("FR"), None)
    };
    let record = create(&dispatcher, fields).await;

    let err = submit(&dispatcher, record.record_id()).await.unwrap_err();
    assert_eq!(err.message(), ALREADY_SUBMITTED);
}

#[tokio::test]
async fn partial_update_is_validated_against_its_own_fields_only() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("DE"), Some("a@b.com"))).await;

    // The payload carries no country, so the German email rule does not fire
    // even though the stored record is German.
    let response = dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Update {
                id: record.record_id(),
                fields: payload(None, Some("")),
            },
        )
        .await
        .unwrap();

    let OnboardingResponse::Record(updated) = response else {
        panic!("expected a record");
    };
    assert_eq!(updated.country(), Some("DE"));
    assert_eq!(updated.email(), Some(""));
    assert_eq!(store.snapshot().await, vec![updated]);
}

#[tokio::test]
async fn update_that_sets_germany_without_email_is_rejected() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("FR"), None)).await;

    let err = dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Update {
                id: record.record_id(),
                fields: payload(Some("DE"), None),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Domain(DomainError::Validation(_))));
    assert_eq!(store.snapshot().await, vec![record]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_on_one_record_succeed_exactly_once() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("FR"), None)).await;
    let id = record.record_id();

    let attempts = (0..8)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { submit(&dispatcher, id).await })
        })
        .collect::<Vec<_>>();

    let mut successes = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(review) => {
                assert_eq!(review, SubmittedReview::new(id));
                successes += 1;
            }
            Err(DomainError::Conflict(msg)) => {
                assert_eq!(msg, ALREADY_SUBMITTED);
                conflicts += 1;
            }
            Err(other) => panic!("unexpected rejection: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.snapshot().await[0].status(), OnboardingStatus::Submitted);
}

#[tokio::test]
async fn list_returns_records_oldest_first() {
    let (dispatcher, _store) = setup();
    let first = create(&dispatcher, payload(Some("FR"), None)).await;
    let second = create(&dispatcher, payload(Some("DE"), Some("a@b.com"))).await;

    let response = dispatcher
        .dispatch(&RequestContext::new(), OnboardingRequest::List)
        .await
        .unwrap();

    let OnboardingResponse::Records(records) = response else {
        panic!("expected records");
    };
    assert_eq!(records.len(), 2);
    assert!(records[0].created_at() <= records[1].created_at());
    let ids: Vec<_> = records.iter().map(|r| r.record_id()).collect();
    assert!(ids.contains(&first.record_id()));
    assert!(ids.contains(&second.record_id()));
}

#[tokio::test]
async fn update_with_null_email_clears_the_stored_email() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("FR"), Some("a@b.com"))).await;

    let response = dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Update {
                id: record.record_id(),
                fields: OnboardingFields {
                    email: Some(None),
                    ..OnboardingFields::default()
                },
            },
        )
        .await
        .unwrap();

    let OnboardingResponse::Record(updated) = response else {
        panic!("expected a record");
    };
    assert_eq!(updated.email(), None);
    assert_eq!(updated.country(), Some("FR"));
    assert_eq!(store.snapshot().await, vec![updated]);
}

#[tokio::test]
async fn clearing_the_email_of_a_german_customer_is_rejected() {
    let (dispatcher, store) = setup();
    let record = create(&dispatcher, payload(Some("DE"), Some("a@b.com"))).await;

    let err = dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Update {
                id: record.record_id(),
                fields: OnboardingFields {
                    email: Some(None),
                    ..payload(Some("DE"), None)
                },
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Domain(DomainError::Validation(_))));
    assert_eq!(store.snapshot().await, vec![record]);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn customer_emails_stay_out_of_store_spans_and_logs() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (dispatcher, _store) = setup();
    let record = create(&dispatcher, payload(Some("DE"), Some("jane.doe@example.com"))).await;
    dispatcher
        .dispatch(
            &RequestContext::new(),
            OnboardingRequest::Update {
                id: record.record_id(),
                fields: payload(None, Some("john.roe@example.com")),
            },
        )
        .await
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("onboarding request created"));
    assert!(output.contains(&record.record_id().to_string()));
    assert!(!output.contains("jane.doe@example.com"));
    assert!(!output.contains("john.roe@example.com"));
}
