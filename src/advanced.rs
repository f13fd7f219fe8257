use std::collections::HashMap;

use serde_json::{Map, Value};

/// One lazily-validated JSON object slot: the literal text the user typed
/// plus the parsed object it started from. Text is only parsed at submit
/// time so transient invalid JSON never blocks interactive editing.
#[derive(Debug, Clone, Default)]
pub(crate) struct JsonObjectSlot {
    initial: Option<Map<String, Value>>,
    raw: Option<String>,
}

impl JsonObjectSlot {
    pub(crate) fn seed(&mut self, parsed: Map<String, Value>) {
        self.initial = if parsed.is_empty() { None } else { Some(parsed) };
        self.raw = None;
    }

    pub(crate) fn set_raw(&mut self, text: &str) {
        self.raw = Some(text.to_string());
    }

    /// Text to show in an editor: the literal text if the slot was touched,
    /// otherwise the pretty-printed initial object.
    pub(crate) fn display_text(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        match &self.initial {
            Some(initial) => {
                serde_json::to_string_pretty(&Value::Object(initial.clone())).unwrap_or_default()
            }
            None => String::new(),
        }
    }

    /// Resolve the slot to its effective object. An untouched slot falls
    /// back to the initial object; blank text means "nothing set"; anything
    /// that is not a JSON object is a validation failure.
    pub(crate) fn resolve(&self) -> Result<Option<Map<String, Value>>, String> {
        let raw = match &self.raw {
            Some(raw) => raw,
            None => return Ok(self.initial.clone()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let value: Value =
            serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;
        match value {
            Value::Object(map) => {
                if map.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(map))
                }
            }
            _ => Err("expected a JSON object".to_string()),
        }
    }
}

/// Per-key advanced settings for one dimension of an edit session.
#[derive(Debug, Clone, Default)]
pub(crate) struct AdvancedStore {
    slots: HashMap<String, JsonObjectSlot>,
}

impl AdvancedStore {
    pub(crate) fn seed(&mut self, key: &str, parsed: Map<String, Value>) {
        self.slots.entry(key.to_string()).or_default().seed(parsed);
    }

    pub(crate) fn set_raw(&mut self, key: &str, text: &str) {
        self.slots
            .entry(key.to_string())
            .or_default()
            .set_raw(text);
    }

    pub(crate) fn init_empty(&mut self, key: &str) {
        self.slots.insert(key.to_string(), JsonObjectSlot::default());
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.slots.remove(key);
    }

    pub(crate) fn display_text(&self, key: &str) -> String {
        self.slots
            .get(key)
            .map(JsonObjectSlot::display_text)
            .unwrap_or_default()
    }

    pub(crate) fn resolve(&self, key: &str) -> Result<Option<Map<String, Value>>, String> {
        match self.slots.get(key) {
            Some(slot) => slot.resolve(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn untouched_slot_falls_back_to_initial() {
        let mut store = AdvancedStore::default();
        store.seed("explore", object(json!({ "temperature": 0.5 })));
        let resolved = store.resolve("explore").expect("resolve");
        assert_eq!(resolved, Some(object(json!({ "temperature": 0.5 }))));
    }

    #[test]
    fn blank_text_means_nothing_set() {
        let mut store = AdvancedStore::default();
        store.seed("explore", object(json!({ "temperature": 0.5 })));
        store.set_raw("explore", "   \n");
        assert_eq!(store.resolve("explore").expect("resolve"), None);
    }

    #[test]
    fn edited_text_wins_over_initial() {
        let mut store = AdvancedStore::default();
        store.seed("explore", object(json!({ "temperature": 0.5 })));
        store.set_raw("explore", r#"{ "topP": 0.9 }"#);
        let resolved = store.resolve("explore").expect("resolve");
        assert_eq!(resolved, Some(object(json!({ "topP": 0.9 }))));
    }

    #[test]
    fn malformed_text_fails_resolution() {
        let mut store = AdvancedStore::default();
        store.set_raw("explore", "{invalid");
        assert!(store.resolve("explore").is_err());
    }

    #[test]
    fn non_object_json_fails_resolution() {
        let mut store = AdvancedStore::default();
        for text in ["[1, 2]", "\"text\"", "42", "null"] {
            store.set_raw("explore", text);
            assert!(store.resolve("explore").is_err(), "accepted {}", text);
        }
    }

    #[test]
    fn empty_object_text_means_nothing_set() {
        let mut store = AdvancedStore::default();
        store.set_raw("explore", "{}");
        assert_eq!(store.resolve("explore").expect("resolve"), None);
    }

    #[test]
    fn unknown_key_resolves_to_nothing() {
        let store = AdvancedStore::default();
        assert_eq!(store.resolve("missing").expect("resolve"), None);
    }

    #[test]
    fn display_text_prefers_raw_then_initial() {
        let mut store = AdvancedStore::default();
        assert_eq!(store.display_text("explore"), "");
        store.seed("explore", object(json!({ "temperature": 0.5 })));
        assert!(store.display_text("explore").contains("temperature"));
        store.set_raw("explore", "{broken");
        assert_eq!(store.display_text("explore"), "{broken");
    }
}
