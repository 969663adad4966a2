//! Remote API seam and submission errors

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while submitting a stack
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A declared parameter without a default was given no value. Caught
    /// locally, before any network call.
    #[error("no value supplied for parameter {name} (declared without a default)")]
    MissingParameter { name: String },

    /// The template body could not be parsed for the pre-flight check
    #[error("template body is not valid JSON: {0}")]
    InvalidTemplate(String),

    /// The remote system rejected the request. The message is passed through
    /// verbatim; causes (malformed document, permission denial, duplicate
    /// stack name, quota) are not classified locally.
    #[error("stack creation rejected: {0}")]
    RemoteRejection(String),
}

/// Result type for submission operations
pub type SubmitResult<T> = Result<T, SubmitError>;

/// One key/value pair in the shape the create-stack call expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

impl StackParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Opaque handle returned by the remote system for a created stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSubmission {
    pub stack_id: String,
}

/// The single remote operation this crate consumes.
///
/// A trait so tests can stand in a recording stub for the real client.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Issue one create-stack request. Not idempotent: a second call with
    /// the same stack name is rejected by the remote system.
    async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> SubmitResult<StackSubmission>;
}
