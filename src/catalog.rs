use std::collections::HashMap;

use serde::Serialize;

use crate::types::Dimension;

/// Bumped whenever the builtin agent or category definitions change.
pub const CATALOG_VERSION: u32 = 3;

/// One builtin agent or category definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDef {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_model: Option<&'static str>,
}

/// UI grouping for builtin agents. Sections are catalog structure only and
/// never contribute keys to a document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub title: &'static str,
    pub entries: Vec<CatalogDef>,
}

/// The static builtin catalog for one release of the app.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    pub agent_sections: Vec<CatalogSection>,
    pub categories: Vec<CatalogDef>,
}

fn def(
    key: &'static str,
    display_name: &'static str,
    description: &'static str,
    recommended_model: Option<&'static str>,
) -> CatalogDef {
    CatalogDef {
        key,
        display_name,
        description,
        recommended_model,
    }
}

impl BuiltinCatalog {
    /// Builtin definitions shipped with the current release.
    pub fn standard() -> Self {
        BuiltinCatalog {
            agent_sections: vec![
                CatalogSection {
                    title: "Research",
                    entries: vec![
                        def(
                            "explore",
                            "Explore",
                            "Fast codebase search and summarization",
                            Some("anthropic/claude-haiku"),
                        ),
                        def(
                            "oracle",
                            "Oracle",
                            "Deep reasoning for architecture and debugging questions",
                            Some("openai/gpt-5"),
                        ),
                        def(
                            "librarian",
                            "Librarian",
                            "External documentation and open-source lookup",
                            Some("anthropic/claude-sonnet"),
                        ),
                    ],
                },
                CatalogSection {
                    title: "Production",
                    entries: vec![
                        def(
                            "frontend",
                            "Frontend",
                            "UI implementation and visual polish",
                            Some("google/gemini-pro"),
                        ),
                        def(
                            "docwriter",
                            "Document Writer",
                            "Long-form technical writing",
                            None,
                        ),
                        def(
                            "reviewer",
                            "Reviewer",
                            "Post-edit review of diffs and plans",
                            Some("anthropic/claude-opus"),
                        ),
                    ],
                },
            ],
            categories: vec![
                def("quick", "Quick", "Trivial single-step tasks", None),
                def(
                    "ultrabrain",
                    "Ultrabrain",
                    "Hardest logic-heavy tasks",
                    Some("openai/gpt-5"),
                ),
                def(
                    "visual-engineering",
                    "Visual Engineering",
                    "Frontend and design-heavy work",
                    Some("google/gemini-pro"),
                ),
                def("writing", "Writing", "Prose and documentation tasks", None),
                def(
                    "unspecified-low",
                    "Unspecified (Low)",
                    "Fallback for cheap uncategorized tasks",
                    None,
                ),
                def(
                    "unspecified-high",
                    "Unspecified (High)",
                    "Fallback for demanding uncategorized tasks",
                    None,
                ),
            ],
        }
    }

    pub fn keys(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Agents => self
                .agent_sections
                .iter()
                .flat_map(|section| section.entries.iter())
                .map(|entry| entry.key.to_string())
                .collect(),
            Dimension::Categories => self
                .categories
                .iter()
                .map(|entry| entry.key.to_string())
                .collect(),
        }
    }

    pub fn contains(&self, dimension: Dimension, key: &str) -> bool {
        match dimension {
            Dimension::Agents => self
                .agent_sections
                .iter()
                .flat_map(|section| section.entries.iter())
                .any(|entry| entry.key == key),
            Dimension::Categories => self.categories.iter().any(|entry| entry.key == key),
        }
    }

    pub fn find(&self, dimension: Dimension, key: &str) -> Option<&CatalogDef> {
        match dimension {
            Dimension::Agents => self
                .agent_sections
                .iter()
                .flat_map(|section| section.entries.iter())
                .find(|entry| entry.key == key),
            Dimension::Categories => self.categories.iter().find(|entry| entry.key == key),
        }
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        BuiltinCatalog::standard()
    }
}

/// Read-only snapshot of selectable models and the variants each supports,
/// taken once when an edit session opens.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<String>,
    variants: HashMap<String, Vec<String>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        ModelCatalog::default()
    }

    pub fn with_model(mut self, id: &str, variants: &[&str]) -> Self {
        if !self.variants.contains_key(id) {
            self.models.push(id.to_string());
        }
        self.variants.insert(
            id.to_string(),
            variants.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn model_ids(&self) -> &[String] {
        &self.models
    }

    pub fn has_model(&self, id: &str) -> bool {
        self.variants.contains_key(id)
    }

    pub fn variants_for(&self, model: &str) -> &[String] {
        self.variants.get(model).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn supports_variant(&self, model: &str, variant: &str) -> bool {
        self.variants_for(model).iter().any(|v| v == variant)
    }
}
