use thiserror::Error;

use crate::schema::{ContinuationToken, Page, SourceKind};

/// Failure of a single remote listing call.
///
/// A `RemoteError` ends enumeration of one source in one region.
/// It never propagates past the partition worker.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request body could not be built; nothing was sent
    #[error("could not build request: {0}")]
    Request(String),

    /// Connection, TLS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Missing permission, bad or expired credentials
    #[error("authorization failed ({code}): {message}")]
    Auth { code: String, message: String },

    #[error("request throttled ({code}): {message}")]
    Throttled { code: String, message: String },

    /// Any other non-success response
    #[error("service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// Success status but the body was not the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// PaginatedSource is the abstraction between:
/// - The generic partition workers
/// - One concrete remote listing API
///
/// Each implementation must:
/// - Issue exactly one remote call per `fetch_page`
/// - Thread the given token into that call unchanged
/// - Normalize entries into `RawRecord`s
///
/// DESIGN GOALS:
/// - Zero API-specific logic outside sources
/// - One source per `SourceKind`
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - A single source instance is shared by every region worker
///
#[async_trait::async_trait]
pub trait PaginatedSource: Send + Sync {
    /// The kind stamped on every item this source yields.
    fn kind(&self) -> SourceKind;

    /// Fetches one page of records for `partition`.
    ///
    /// `token` is `None` for the first page, afterwards the
    /// `next_token` of the previous page.
    ///
    /// MUST NOT:
    /// - Retry internally
    /// - Fetch more than one page
    ///
    async fn fetch_page(
        &self,
        partition: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, RemoteError>;
}
