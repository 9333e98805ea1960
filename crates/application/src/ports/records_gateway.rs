//! Student records API port

use std::future::Future;

use serde_json::Value;

use crate::ApplicationResult;

/// Port for the records service's JSON-over-POST endpoints.
pub trait RecordsGateway: Send + Sync {
    /// Posts `body` to `endpoint` (e.g. `/api/addStudent`) and returns the
    /// decoded JSON response, whatever its shape.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or the body is not JSON.
    fn post(
        &self,
        endpoint: &'static str,
        body: Value,
    ) -> impl Future<Output = ApplicationResult<Value>> + Send;
}
