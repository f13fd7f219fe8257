use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Which half of a document an operation targets. Agents and categories are
/// separate key namespaces with identical entry shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Agents,
    Categories,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Agents => "agents",
            Dimension::Categories => "categories",
        }
    }
}

/// One named agent or task-category configuration.
///
/// `model` and `variant` are the structured fields; everything else the user
/// (or an imported file) put on the entry rides along in `advanced`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(flatten)]
    pub advanced: Map<String, Value>,
}

impl AgentEntry {
    /// Entries with nothing set are omitted from the composed document.
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.variant.is_none() && self.advanced.is_empty()
    }

    /// Trim the structured fields and drop them when blank.
    pub(crate) fn normalized(mut self) -> Self {
        self.model = self
            .model
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        self.variant = self
            .variant
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        self
    }
}

/// The persisted configuration document.
///
/// Root fields the structured editors do not recognize are captured by the
/// flattened `other_fields` map and written back verbatim on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub agents: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub categories: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub other_fields: Map<String, Value>,
}

impl ConfigDocument {
    pub fn new(name: &str) -> Self {
        ConfigDocument {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: Some(now_millis()),
            ..ConfigDocument::default()
        }
    }

    pub fn entries(&self, dimension: Dimension) -> &Map<String, Value> {
        match dimension {
            Dimension::Agents => &self.agents,
            Dimension::Categories => &self.categories,
        }
    }
}

/// The model/variant pair bound to a single agent or category key during an
/// edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelBinding {
    pub model: Option<String>,
    pub variant: Option<String>,
}

impl ModelBinding {
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.variant.is_none()
    }
}

/// One transient rewrite of model bindings across the whole session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReplaceSpec {
    #[serde(default)]
    pub from_model: String,
    #[serde(default)]
    pub from_variant: Option<String>,
    #[serde(default)]
    pub to_model: String,
    #[serde(default)]
    pub to_variant: Option<String>,
}

/// Result of a well-formed batch replacement. A vacuous match is reported as
/// `NoMatch` rather than an error so the caller can phrase it accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReplaceOutcome {
    NoMatch,
    Applied {
        rewritten: usize,
        variants_cleared: usize,
    },
}

/// Per-dimension counts reported after folding an imported fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub agents_affected: usize,
    pub categories_affected: usize,
}

/// Error type for composition operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// User input rejected before any state was mutated.
    Validation(String),
    /// Failure reported by the persistence collaborator; session state is
    /// left intact so the user can retry.
    Persistence(String),
}

impl std::fmt::Display for ComposeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposeError::Validation(message) => write!(f, "{}", message),
            ComposeError::Persistence(message) => write!(f, "Failed to save: {}", message),
        }
    }
}

impl From<ComposeError> for String {
    fn from(err: ComposeError) -> String {
        err.to_string()
    }
}
