use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::{AgentEntry, ModelBinding};

/// Older frontends grouped agent lists with sentinel keys wrapped in double
/// underscores. Those keys carry no configuration and are filtered wherever a
/// document is read; they are never written back.
pub(crate) fn is_separator_key(key: &str) -> bool {
    key.len() >= 4 && key.starts_with("__") && key.ends_with("__")
}

/// Normalize one dimension of a stored or imported document into
/// `(key, entry)` pairs.
///
/// Keys are lower-cased to reconcile documents written before the catalog
/// settled on lower-case keys. When two historically-cased keys collapse to
/// the same normalized key the later one wins and a warning is logged.
/// Separator keys and malformed entries are dropped individually.
pub(crate) fn decode_entries(label: &str, entries: &Map<String, Value>) -> Vec<(String, AgentEntry)> {
    let mut decoded: Vec<(String, AgentEntry)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (key, value) in entries {
        if is_separator_key(key) {
            continue;
        }
        if !value.is_object() {
            log::warn!("Skipping malformed {} entry '{}': not an object", label, key);
            continue;
        }
        let entry = match serde_json::from_value::<AgentEntry>(value.clone()) {
            Ok(entry) => entry.normalized(),
            Err(err) => {
                log::warn!("Skipping malformed {} entry '{}': {}", label, key, err);
                continue;
            }
        };

        let normalized = key.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        match positions.get(&normalized) {
            Some(&index) => {
                log::warn!(
                    "Duplicate {} key '{}' after case normalization; keeping the later entry",
                    label,
                    normalized
                );
                decoded[index].1 = entry;
            }
            None => {
                positions.insert(normalized.clone(), decoded.len());
                decoded.push((normalized, entry));
            }
        }
    }

    decoded
}

/// Rebuild one dimension map from session state.
///
/// For each key the resolved advanced object is spread first; when the
/// binding carries a variant, a `variant` field inside the advanced object is
/// discarded so the binding stays the single source of truth. Keys whose
/// reconstructed entry would be empty are omitted entirely.
pub(crate) fn encode_dimension(
    keys: &[String],
    bindings: &HashMap<String, ModelBinding>,
    advanced: &HashMap<String, Map<String, Value>>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for key in keys {
        let mut entry = advanced.get(key).cloned().unwrap_or_default();
        if let Some(binding) = bindings.get(key) {
            if binding.variant.is_some() {
                entry.remove("variant");
            }
            if let Some(model) = &binding.model {
                entry.insert("model".to_string(), Value::String(model.clone()));
            }
            if let Some(variant) = &binding.variant {
                entry.insert("variant".to_string(), Value::String(variant.clone()));
            }
        }
        if !entry.is_empty() {
            out.insert(key.clone(), Value::Object(entry));
        }
    }
    out
}
