use serde::Deserialize;

use crate::{
    aws::AwsJsonClient,
    schema::{ContinuationToken, Page, RawRecord, SourceKind},
};

use super::PageRequest;
use super::adapter::{PaginatedSource, RemoteError};

const SERVICE: &str = "secretsmanager";
const TARGET: &str = "secretsmanager.ListSecrets";

/// Secrets Manager `ListSecrets` source.
///
/// Lists secret metadata only. Values are never read here; the
/// loot stage emits the command that would fetch them.
pub struct SecretsManagerSource {
    client: AwsJsonClient,
}

impl SecretsManagerSource {
    pub fn new(client: AwsJsonClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListSecretsResponse {
    #[serde(default)]
    secret_list: Vec<SecretListEntry>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SecretListEntry {
    name: Option<String>,
    description: Option<String>,
}

impl From<ListSecretsResponse> for Page {
    fn from(resp: ListSecretsResponse) -> Self {
        Page {
            records: resp
                .secret_list
                .into_iter()
                .map(|s| RawRecord {
                    name: s.name.unwrap_or_default(),
                    description: s.description,
                })
                .collect(),
            next_token: resp.next_token.map(ContinuationToken::new),
        }
    }
}

#[async_trait::async_trait]
impl PaginatedSource for SecretsManagerSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SecretsManager
    }

    async fn fetch_page(
        &self,
        partition: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, RemoteError> {
        let resp: ListSecretsResponse = self
            .client
            .call(SERVICE, TARGET, partition, &PageRequest::new(token))
            .await?;
        Ok(resp.into())
    }
}
