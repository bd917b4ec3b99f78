//! Interpretation of status codes returned by the external query endpoint.

/// Upstream status codes that end polling with a failure.
pub const TERMINAL_FAILURE_STATUSES: [u16; 3] = [400, 404, 500];

/// Status code that ends polling with a finished artifact.
pub const COMPLETED_STATUS: u16 = 200;

/// What the poller should do after a single query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDisposition {
    /// The artifact is ready in the response body.
    Completed,
    /// The task failed upstream; the status is passed through to the caller.
    Rejected(u16),
    /// The task is still running; wait and query again.
    Pending,
}

/// Classify a query response status code.
///
/// Anything outside the terminal allowlist (202, 503, 429, ...) counts as
/// still processing.
pub fn classify(status: u16) -> QueryDisposition {
    if status == COMPLETED_STATUS {
        QueryDisposition::Completed
    } else if TERMINAL_FAILURE_STATUSES.contains(&status) {
        QueryDisposition::Rejected(status)
    } else {
        QueryDisposition::Pending
    }
}
