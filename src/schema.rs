use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Closed set of listing operations the enumerator knows how to drive.
///
/// Every downstream consumer (output table, loot commands, source
/// registry) matches on this enum, so adding a variant is a compile
/// error everywhere it has to be handled.
///
/// IMPORTANT:
/// - The serde names are what `config.json` uses in `sources`
/// - `label()` is what the user sees in tables and logs
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Secrets Manager `ListSecrets`
    #[serde(alias = "secrets_manager")]
    SecretsManager,

    /// SSM Parameter Store `DescribeParameters`
    Ssm,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::SecretsManager, SourceKind::Ssm];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::SecretsManager => "SecretsManager",
            SourceKind::Ssm => "SSM",
        }
    }

    /// Command that pulls the full value of an enumerated resource.
    ///
    /// `$profile` is left for the operator to export; it is rarely
    /// the profile the enumeration ran with.
    pub fn loot_command(self, region: &str, name: &str) -> String {
        match self {
            SourceKind::SecretsManager => format!(
                "aws --profile $profile --region {region} secretsmanager get-secret-value --secret-id {name}"
            ),
            SourceKind::Ssm => format!(
                "aws --profile $profile --region {region} ssm get-parameter --with-decryption --name {name}"
            ),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ------------------------------------------------------------
// Item
// ------------------------------------------------------------
//
// One discovered resource, normalized across source kinds.
//
// Built by a partition worker from one page record and never
// mutated afterwards. The collector owns it once submitted.
//
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Which listing operation produced the item
    #[serde(rename = "service", serialize_with = "serialize_label")]
    pub source_kind: SourceKind,

    /// Region the item was listed in
    #[serde(rename = "region")]
    pub partition: String,

    pub name: String,

    /// Empty when the remote record carried no description
    pub description: String,
}

impl Item {
    pub fn from_record(source_kind: SourceKind, partition: &str, record: RawRecord) -> Self {
        Self {
            source_kind,
            partition: partition.to_string(),
            name: record.name,
            description: record.description.unwrap_or_default(),
        }
    }

    pub fn loot_command(&self) -> String {
        self.source_kind.loot_command(&self.partition, &self.name)
    }
}

// JSON output shows the same service name as the table; the
// lowercase serde names are for config input only.
fn serialize_label<S: Serializer>(kind: &SourceKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.label())
}

/// Arrival-ordered items as appended by the collector.
pub type ResultCollection = Vec<Item>;

// ------------------------------------------------------------
// Paging primitives
// ------------------------------------------------------------

/// Opaque continuation token handed back by a remote listing call.
///
/// Never inspected, only threaded into the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Source-agnostic view of one page entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    pub description: Option<String>,
}

/// One bounded batch returned by a single `fetch_page` call.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<RawRecord>,

    /// `None` when the source has no further pages
    pub next_token: Option<ContinuationToken>,
}
