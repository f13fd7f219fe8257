use crate::codec::is_separator_key;

/// Key set for one dimension of an edit session: the fixed builtin keys plus
/// user-defined custom keys in discovery order.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    builtin: Vec<String>,
    custom: Vec<String>,
}

impl KeyRegistry {
    pub fn new(builtin: Vec<String>) -> Self {
        KeyRegistry {
            builtin,
            custom: Vec::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.is_builtin(key) || self.is_custom(key)
    }

    pub fn is_builtin(&self, key: &str) -> bool {
        self.builtin.iter().any(|k| k == key)
    }

    pub fn is_custom(&self, key: &str) -> bool {
        self.custom.iter().any(|k| k == key)
    }

    /// Add a user-defined key. Keys are trimmed and lower-cased so they match
    /// the normalization applied when documents are loaded.
    pub fn add(&mut self, key: &str) -> Result<String, String> {
        let normalized = key.trim().to_lowercase();
        if normalized.is_empty() {
            return Err("Key cannot be empty".to_string());
        }
        if is_separator_key(&normalized) {
            return Err(format!("Key '{}' uses a reserved marker", normalized));
        }
        if self.contains(&normalized) {
            return Err(format!("Key '{}' already exists", normalized));
        }
        self.custom.push(normalized.clone());
        Ok(normalized)
    }

    /// Register a key discovered in a loaded or imported document. Builtin
    /// and already-known keys are left alone; anything else becomes custom.
    pub fn register_discovered(&mut self, key: &str) {
        if !self.contains(key) {
            self.custom.push(key.to_string());
        }
    }

    /// Remove a custom key. Builtin keys cannot be removed; returns whether
    /// anything changed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|k| k != key);
        self.custom.len() != before
    }

    pub fn custom_keys(&self) -> &[String] {
        &self.custom
    }

    /// Builtin keys first, then custom keys in discovery order.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = self.builtin.clone();
        keys.extend(self.custom.iter().cloned());
        keys
    }
}
