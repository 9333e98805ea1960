//! Time authority status port

use std::future::Future;

use serde_json::Value;

use crate::ApplicationResult;

/// Port for the one-shot baseline read.
///
/// Implementations return the raw JSON body; validation happens in the
/// application layer so that transport and schema failures stay distinct.
pub trait StatusSource: Send + Sync {
    /// Fetches the current status document from the time authority.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Transport` or `ApplicationError::Timeout`
    /// if no JSON body could be obtained.
    fn fetch_status(&self) -> impl Future<Output = ApplicationResult<Value>> + Send;
}
