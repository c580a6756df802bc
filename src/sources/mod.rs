//! Paginated source registry and factory
//!
//! This module provides:
//! - The `PaginatedSource` contract every listing API implements
//! - A factory resolving a `SourceKind` to its implementation
//!
//! All API-specific request/response handling lives in the dedicated
//! source modules. Workers interact exclusively through the trait.

pub mod adapter;
mod secrets_manager;
mod ssm;

use std::sync::Arc;

use serde::Serialize;

use crate::aws::AwsJsonClient;
use crate::schema::{ContinuationToken, SourceKind};
use adapter::PaginatedSource;

pub use secrets_manager::SecretsManagerSource;
pub use ssm::SsmParameterSource;

/// Returns the source implementation for `kind`.
///
/// The match is exhaustive over `SourceKind`, so a new kind cannot be
/// configured without a source behind it.
///
/// THREADING:
/// - Sources are wrapped in `Arc`
/// - The same instance is shared by every region worker
///
pub fn get_source(kind: SourceKind, client: &AwsJsonClient) -> Arc<dyn PaginatedSource> {
    match kind {
        SourceKind::SecretsManager => Arc::new(SecretsManagerSource::new(client.clone())),
        SourceKind::Ssm => Arc::new(SsmParameterSource::new(client.clone())),
    }
}

/// Body shared by both listing calls: only the continuation token.
#[derive(Debug, Serialize)]
struct PageRequest<'a> {
    #[serde(rename = "NextToken", skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

impl<'a> PageRequest<'a> {
    fn new(token: Option<&'a ContinuationToken>) -> Self {
        Self {
            next_token: token.map(ContinuationToken::as_str),
        }
    }
}
