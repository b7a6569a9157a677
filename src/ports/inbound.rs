//! Inbound port. The invocation harness calls into the application.

use serde::Serialize;

/// Structured result of one digest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub status: u16,
    pub body: InvocationBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InvocationBody {
    #[serde(rename_all = "camelCase")]
    Completed {
        start_date: String,
        end_date: String,
        sent_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    Failed { error_kind: String, message: String },
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Zero-argument trigger: run the weekly digest once.
#[async_trait::async_trait]
pub trait DigestTrigger: Send + Sync {
    async fn invoke(&self) -> InvocationResult;
}
