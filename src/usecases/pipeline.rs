//! Weekly digest pipeline: compute week -> fetch recipients/content -> render -> dispatch.
//!
//! - Zero recipients is a successful skip: nothing is rendered or sent
//! - Rendering completes before the single send attempt
//! - Every step error is translated here, once, into the structured result

use crate::domain::{compute_reporting_week, compute_week_label, DomainError, ReportingWeek};
use crate::ports::{DigestTrigger, InvocationBody, InvocationResult};
use crate::usecases::{ContentAggregator, DigestDispatcher, DigestRenderer};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;
use tracing::{error, info};

/// Run states, in order. `Skipped` and `Done` are terminal successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    WeekComputed,
    DataFetched,
    Skipped,
    Rendered,
    Dispatched,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "start",
            PipelineState::WeekComputed => "week_computed",
            PipelineState::DataFetched => "data_fetched",
            PipelineState::Skipped => "skipped",
            PipelineState::Rendered => "rendered",
            PipelineState::Dispatched => "dispatched",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub week: ReportingWeek,
    pub state: PipelineState,
    pub sent_count: usize,
}

pub struct DigestPipeline {
    aggregator: ContentAggregator,
    renderer: DigestRenderer,
    dispatcher: DigestDispatcher,
    tz: Tz,
}

impl DigestPipeline {
    pub fn new(
        aggregator: ContentAggregator,
        renderer: DigestRenderer,
        dispatcher: DigestDispatcher,
        tz: Tz,
    ) -> Self {
        Self {
            aggregator,
            renderer,
            dispatcher,
            tz,
        }
    }

    /// Run for the week containing the current instant.
    pub async fn run(&self) -> InvocationResult {
        self.run_at(Utc::now()).await
    }

    /// Run for the week containing `now`, mapping the outcome to the invocation result.
    pub async fn run_at(&self, now: DateTime<Utc>) -> InvocationResult {
        match self.execute(now).await {
            Ok(outcome) => InvocationResult {
                status: 200,
                body: InvocationBody::Completed {
                    start_date: outcome.week.start.to_string(),
                    end_date: outcome.week.end.to_string(),
                    sent_count: outcome.sent_count,
                },
            },
            Err(e) => {
                error!(
                    state = %PipelineState::Failed,
                    kind = e.kind(),
                    error = %e,
                    "digest run failed"
                );
                InvocationResult {
                    status: 500,
                    body: InvocationBody::Failed {
                        error_kind: e.kind().to_string(),
                        message: e.to_string(),
                    },
                }
            }
        }
    }

    async fn execute(&self, now: DateTime<Utc>) -> Result<RunOutcome, DomainError> {
        info!(state = %PipelineState::Start, now = %now, tz = %self.tz, "digest run started");

        let week = compute_reporting_week(now, self.tz);
        let label = compute_week_label(&week);
        info!(
            state = %PipelineState::WeekComputed,
            start = %week.start,
            end = %week.end,
            month = label.month,
            week_of_month = label.week_of_month,
            "reporting week computed"
        );

        let recipients = self.aggregator.fetch_recipients().await?;
        if recipients.is_empty() {
            info!(state = %PipelineState::Skipped, "no recipients; nothing rendered or sent");
            return Ok(RunOutcome {
                week,
                state: PipelineState::Skipped,
                sent_count: 0,
            });
        }
        let items = self.aggregator.fetch_content_for_week(&week).await?;
        info!(
            state = %PipelineState::DataFetched,
            recipients = recipients.len(),
            items = items.len(),
            "data fetched"
        );

        let document = self.renderer.render(&items, &label);
        info!(
            state = %PipelineState::Rendered,
            subject = %document.subject,
            html_len = document.html.len(),
            "digest rendered"
        );

        let receipt = self.dispatcher.send(&recipients, document).await?;
        info!(
            state = %PipelineState::Dispatched,
            message_id = %receipt.message_id,
            "digest dispatched"
        );

        info!(state = %PipelineState::Done, sent = receipt.recipient_count, "digest run finished");
        Ok(RunOutcome {
            week,
            state: PipelineState::Done,
            sent_count: receipt.recipient_count,
        })
    }
}

#[async_trait::async_trait]
impl DigestTrigger for DigestPipeline {
    async fn invoke(&self) -> InvocationResult {
        self.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::LogMailer;
    use crate::domain::{ContentRow, OutboundEmail};
    use crate::ports::{ContentStore, MailPort};
    use chrono::{NaiveDateTime, TimeZone};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SEOUL: Tz = chrono_tz::Asia::Seoul;

    struct FakeStore {
        recipients: Vec<String>,
        rows: Vec<ContentRow>,
        content_down: bool,
        content_calls: AtomicUsize,
    }

    impl FakeStore {
        fn new(recipients: &[&str], rows: Vec<ContentRow>) -> Self {
            Self {
                recipients: recipients.iter().map(|s| s.to_string()).collect(),
                rows,
                content_down: false,
                content_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ContentStore for FakeStore {
        async fn fetch_recipients(&self) -> Result<Vec<String>, DomainError> {
            Ok(self.recipients.clone())
        }

        async fn fetch_content_rows(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<ContentRow>, DomainError> {
            self.content_calls.fetch_add(1, Ordering::SeqCst);
            if self.content_down {
                return Err(DomainError::DataUnavailable("Database connection failed".into()));
            }
            Ok(self.rows.clone())
        }
    }

    struct RejectingMailer;

    #[async_trait::async_trait]
    impl MailPort for RejectingMailer {
        async fn send_email(&self, _email: &OutboundEmail) -> Result<String, DomainError> {
            Err(DomainError::DispatchFailed("throttled".into()))
        }
    }

    fn mocked_row() -> ContentRow {
        ContentRow {
            id: 1,
            sentence: "Mocked sentence".into(),
            meaning: "모의 문장".into(),
            created_at: NaiveDateTime::parse_from_str("2025-05-12 00:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            vocab_id: None,
            vocab_word: None,
            vocab_definition: None,
            video_url: None,
        }
    }

    fn pipeline(store: Arc<FakeStore>, mail: Arc<dyn MailPort>) -> DigestPipeline {
        DigestPipeline::new(
            ContentAggregator::new(store, SEOUL),
            DigestRenderer::new(),
            DigestDispatcher::new(mail, "digest@example.com".into()),
            SEOUL,
        )
    }

    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_single_recipient_end_to_end() {
        let store = Arc::new(FakeStore::new(&["a@example.com"], vec![mocked_row()]));
        let mailer = Arc::new(LogMailer::new());

        let result = pipeline(store, mailer.clone()).run_at(wednesday()).await;

        assert_eq!(
            result,
            InvocationResult {
                status: 200,
                body: InvocationBody::Completed {
                    start_date: "2025-05-12".into(),
                    end_date: "2025-05-18".into(),
                    sent_count: 1,
                },
            }
        );
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["a@example.com".to_string()]);
        assert!(sent[0].html.contains("Mocked sentence"));
        assert!(sent[0].html.contains("5월 2주차 주간 영어 문장"));
        assert!(!sent[0].html.contains("class=\"vocab\""));
        assert!(!sent[0].html.contains("class=\"video\""));
    }

    #[tokio::test]
    async fn test_empty_recipients_skips_render_and_dispatch() {
        let store = Arc::new(FakeStore::new(&[], vec![mocked_row()]));
        let mailer = Arc::new(LogMailer::new());
        let pipeline = pipeline(store.clone(), mailer.clone());

        let outcome = pipeline.execute(wednesday()).await.unwrap();
        assert_eq!(outcome.state, PipelineState::Skipped);
        assert_eq!(outcome.sent_count, 0);

        let result = pipeline.run_at(wednesday()).await;
        assert!(result.is_success());
        assert_eq!(
            result.body,
            InvocationBody::Completed {
                start_date: "2025-05-12".into(),
                end_date: "2025-05-18".into(),
                sent_count: 0,
            }
        );
        assert!(mailer.sent().is_empty());
        assert_eq!(store.content_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_500_without_sending() {
        let mut store = FakeStore::new(&["a@example.com"], vec![]);
        store.content_down = true;
        let mailer = Arc::new(LogMailer::new());

        let result = pipeline(Arc::new(store), mailer.clone()).run_at(wednesday()).await;

        assert_eq!(result.status, 500);
        match result.body {
            InvocationBody::Failed { error_kind, message } => {
                assert_eq!(error_kind, "DataUnavailable");
                assert!(message.contains("Database connection failed"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_maps_to_500() {
        let store = Arc::new(FakeStore::new(&["a@example.com"], vec![mocked_row()]));
        let result = pipeline(store, Arc::new(RejectingMailer)).run_at(wednesday()).await;
        assert_eq!(result.status, 500);
        assert!(matches!(
            result.body,
            InvocationBody::Failed { ref error_kind, .. } if error_kind == "DispatchFailed"
        ));
    }

    #[tokio::test]
    async fn test_sunday_run_covers_previous_monday() {
        let store = Arc::new(FakeStore::new(&["a@example.com"], vec![]));
        let mailer = Arc::new(LogMailer::new());
        let sunday = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let outcome = pipeline(store, mailer.clone()).execute(sunday).await.unwrap();

        assert_eq!(outcome.week.start.to_string(), "2025-05-26");
        assert_eq!(outcome.week.end.to_string(), "2025-06-01");
        assert_eq!(mailer.sent()[0].subject, "[매일영어] 5월 4주차 주간 영어 문장");
    }

    #[test]
    fn test_result_serializes_to_invocation_contract() {
        let ok = InvocationResult {
            status: 200,
            body: InvocationBody::Completed {
                start_date: "2025-05-12".into(),
                end_date: "2025-05-18".into(),
                sent_count: 3,
            },
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({
                "status": 200,
                "body": { "startDate": "2025-05-12", "endDate": "2025-05-18", "sentCount": 3 }
            })
        );

        let failed = InvocationResult {
            status: 500,
            body: InvocationBody::Failed {
                error_kind: "DispatchFailed".into(),
                message: "throttled".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({
                "status": 500,
                "body": { "errorKind": "DispatchFailed", "message": "throttled" }
            })
        );
    }
}
