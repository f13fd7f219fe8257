use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::advanced::AdvancedStore;
use crate::codec::decode_entries;
use crate::registry::KeyRegistry;
use crate::types::ModelBinding;

/// An externally supplied configuration fragment. Everything is optional;
/// the fragment only speaks for the keys it carries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFragment {
    #[serde(default)]
    pub agents: Map<String, Value>,
    #[serde(default)]
    pub categories: Map<String, Value>,
    #[serde(default)]
    pub other_fields: Map<String, Value>,
}

impl ImportFragment {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| format!("Invalid import JSON: {}", e))?;
        if !value.is_object() {
            return Err("Invalid import payload: expected a JSON object".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("Invalid import payload: {}", e))
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.categories.is_empty() && self.other_fields.is_empty()
    }
}

/// Fold one dimension of a fragment into session state.
///
/// Import is authoritative for the keys it touches: the binding and the
/// advanced slot are replaced wholesale. Keys the fragment does not mention
/// are left alone, unknown keys are registered as custom, and malformed
/// entries are skipped individually. Returns the number of keys affected.
pub(crate) fn fold_dimension(
    label: &str,
    entries: &Map<String, Value>,
    registry: &mut KeyRegistry,
    bindings: &mut HashMap<String, ModelBinding>,
    advanced: &mut AdvancedStore,
) -> usize {
    let mut affected = 0usize;
    for (key, entry) in decode_entries(label, entries) {
        registry.register_discovered(&key);
        bindings.insert(
            key.clone(),
            ModelBinding {
                model: entry.model,
                variant: entry.variant,
            },
        );
        advanced.seed(&key, entry.advanced);
        affected += 1;
    }
    affected
}
