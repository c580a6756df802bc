use serde::Deserialize;

use crate::{
    aws::AwsJsonClient,
    schema::{ContinuationToken, Page, RawRecord, SourceKind},
};

use super::PageRequest;
use super::adapter::{PaginatedSource, RemoteError};

const SERVICE: &str = "ssm";
const TARGET: &str = "AmazonSSM.DescribeParameters";

/// SSM Parameter Store `DescribeParameters` source.
pub struct SsmParameterSource {
    client: AwsJsonClient,
}

impl SsmParameterSource {
    pub fn new(client: AwsJsonClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeParametersResponse {
    #[serde(default)]
    parameters: Vec<ParameterMetadata>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParameterMetadata {
    name: Option<String>,
    description: Option<String>,
}

impl From<DescribeParametersResponse> for Page {
    fn from(resp: DescribeParametersResponse) -> Self {
        Page {
            records: resp
                .parameters
                .into_iter()
                .map(|p| RawRecord {
                    name: p.name.unwrap_or_default(),
                    description: p.description,
                })
                .collect(),
            next_token: resp.next_token.map(ContinuationToken::new),
        }
    }
}

#[async_trait::async_trait]
impl PaginatedSource for SsmParameterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Ssm
    }

    async fn fetch_page(
        &self,
        partition: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, RemoteError> {
        let resp: DescribeParametersResponse = self
            .client
            .call(SERVICE, TARGET, partition, &PageRequest::new(token))
            .await?;
        Ok(resp.into())
    }
}
