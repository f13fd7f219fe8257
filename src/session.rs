use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::advanced::{AdvancedStore, JsonObjectSlot};
use crate::catalog::{BuiltinCatalog, ModelCatalog};
use crate::codec;
use crate::import::{self, ImportFragment};
use crate::registry::KeyRegistry;
use crate::replace;
use crate::storage::ConfigStore;
use crate::types::{
    now_millis, BatchReplaceSpec, ComposeError, ConfigDocument, Dimension, ImportSummary,
    ModelBinding, ReplaceOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Loading,
    Editing,
    Submitting,
}

/// Everything the session tracks for one key namespace.
#[derive(Debug, Clone, Default)]
struct DimensionState {
    registry: KeyRegistry,
    bindings: HashMap<String, ModelBinding>,
    advanced: AdvancedStore,
}

impl DimensionState {
    fn new(builtin: Vec<String>) -> Self {
        DimensionState {
            registry: KeyRegistry::new(builtin),
            bindings: HashMap::new(),
            advanced: AdvancedStore::default(),
        }
    }
}

/// One document edit session.
///
/// Owns all in-memory editing state between load and submit. Nothing is
/// persisted until `submit`, and closing the session discards everything.
/// Catalog and model snapshots are taken at construction and not refreshed
/// mid-session.
pub struct EditSession {
    state: SessionState,
    catalog: BuiltinCatalog,
    models: ModelCatalog,
    record_id: Option<String>,
    name: String,
    created_at: Option<i64>,
    agents: DimensionState,
    categories: DimensionState,
    other_fields: JsonObjectSlot,
}

impl EditSession {
    pub fn new(catalog: BuiltinCatalog, models: ModelCatalog) -> Self {
        let agents = DimensionState::new(catalog.keys(Dimension::Agents));
        let categories = DimensionState::new(catalog.keys(Dimension::Categories));
        EditSession {
            state: SessionState::Closed,
            catalog,
            models,
            record_id: None,
            name: String::new(),
            created_at: None,
            agents,
            categories,
            other_fields: JsonObjectSlot::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn catalog(&self) -> &BuiltinCatalog {
        &self.catalog
    }

    fn reset(&mut self) {
        self.record_id = None;
        self.name.clear();
        self.created_at = None;
        self.agents = DimensionState::new(self.catalog.keys(Dimension::Agents));
        self.categories = DimensionState::new(self.catalog.keys(Dimension::Categories));
        self.other_fields = JsonObjectSlot::default();
    }

    /// Start editing a brand new document.
    pub fn open_new(&mut self, name: &str) {
        self.reset();
        self.name = name.trim().to_string();
        self.state = SessionState::Editing;
    }

    /// Load a stored document into the session.
    ///
    /// Loading the record that is already open is a no-op, so repeated load
    /// calls from a re-rendering caller cannot wipe in-progress edits.
    pub fn load(&mut self, document: &ConfigDocument) {
        if self.state != SessionState::Closed
            && self.record_id.as_deref() == Some(document.id.as_str())
        {
            return;
        }
        self.state = SessionState::Loading;
        self.reset();
        if !document.id.trim().is_empty() {
            self.record_id = Some(document.id.clone());
        }
        self.name = document.name.clone();
        self.created_at = document.created_at;
        self.other_fields.seed(document.other_fields.clone());
        for dimension in [Dimension::Agents, Dimension::Categories] {
            let entries = document.entries(dimension).clone();
            let state = self.dimension_mut(dimension);
            for (key, entry) in codec::decode_entries(dimension.label(), &entries) {
                state.registry.register_discovered(&key);
                let binding = ModelBinding {
                    model: entry.model,
                    variant: entry.variant,
                };
                if !binding.is_empty() {
                    state.bindings.insert(key.clone(), binding);
                }
                state.advanced.seed(&key, entry.advanced);
            }
        }
        self.state = SessionState::Editing;
    }

    /// Discard all in-memory state without saving.
    pub fn close(&mut self) {
        self.reset();
        self.state = SessionState::Closed;
    }

    fn dimension(&self, dimension: Dimension) -> &DimensionState {
        match dimension {
            Dimension::Agents => &self.agents,
            Dimension::Categories => &self.categories,
        }
    }

    fn dimension_mut(&mut self, dimension: Dimension) -> &mut DimensionState {
        match dimension {
            Dimension::Agents => &mut self.agents,
            Dimension::Categories => &mut self.categories,
        }
    }

    fn ensure_editing(&self) -> Result<(), ComposeError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Submitting => Err(ComposeError::Validation(
                "A submit is already in progress".to_string(),
            )),
            _ => Err(ComposeError::Validation(
                "No active edit session".to_string(),
            )),
        }
    }

    fn ensure_known_key(&self, dimension: Dimension, key: &str) -> Result<(), ComposeError> {
        if self.dimension(dimension).registry.contains(key) {
            Ok(())
        } else {
            Err(ComposeError::Validation(format!(
                "Unknown {} key '{}'",
                dimension.label(),
                key
            )))
        }
    }

    pub fn all_keys(&self, dimension: Dimension) -> Vec<String> {
        self.dimension(dimension).registry.all_keys()
    }

    pub fn custom_keys(&self, dimension: Dimension) -> Vec<String> {
        self.dimension(dimension).registry.custom_keys().to_vec()
    }

    pub fn model_of(&self, dimension: Dimension, key: &str) -> Option<String> {
        self.dimension(dimension)
            .bindings
            .get(key)
            .and_then(|binding| binding.model.clone())
    }

    pub fn variant_of(&self, dimension: Dimension, key: &str) -> Option<String> {
        self.dimension(dimension)
            .bindings
            .get(key)
            .and_then(|binding| binding.variant.clone())
    }

    pub fn advanced_text(&self, dimension: Dimension, key: &str) -> String {
        self.dimension(dimension).advanced.display_text(key)
    }

    pub fn other_fields_text(&self) -> String {
        self.other_fields.display_text()
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        self.name = name.trim().to_string();
        Ok(())
    }

    /// Bind a model to a key. Clearing the model clears the variant too, and
    /// a variant the new model does not support is dropped.
    pub fn set_model(
        &mut self,
        dimension: Dimension,
        key: &str,
        model: Option<&str>,
    ) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        self.ensure_known_key(dimension, key)?;
        let model = model.map(str::trim).filter(|value| !value.is_empty());
        let keep_variant = match (model, self.variant_of(dimension, key)) {
            (Some(new_model), Some(variant)) => self.models.supports_variant(new_model, &variant),
            _ => false,
        };

        let state = self.dimension_mut(dimension);
        let binding = state.bindings.entry(key.to_string()).or_default();
        binding.model = model.map(ToString::to_string);
        if !keep_variant {
            binding.variant = None;
        }
        if binding.is_empty() {
            state.bindings.remove(key);
        }
        Ok(())
    }

    pub fn set_variant(
        &mut self,
        dimension: Dimension,
        key: &str,
        variant: Option<&str>,
    ) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        self.ensure_known_key(dimension, key)?;
        let variant = variant.map(str::trim).filter(|value| !value.is_empty());

        let Some(variant) = variant else {
            let state = self.dimension_mut(dimension);
            if let Some(binding) = state.bindings.get_mut(key) {
                binding.variant = None;
                if binding.is_empty() {
                    state.bindings.remove(key);
                }
            }
            return Ok(());
        };

        let model = self.model_of(dimension, key).ok_or_else(|| {
            ComposeError::Validation("Select a model before choosing a variant".to_string())
        })?;
        if !self.models.supports_variant(&model, variant) {
            return Err(ComposeError::Validation(format!(
                "Variant '{}' is not available for model '{}'",
                variant, model
            )));
        }
        let state = self.dimension_mut(dimension);
        state
            .bindings
            .entry(key.to_string())
            .or_default()
            .variant = Some(variant.to_string());
        Ok(())
    }

    pub fn set_advanced_raw(
        &mut self,
        dimension: Dimension,
        key: &str,
        text: &str,
    ) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        self.ensure_known_key(dimension, key)?;
        self.dimension_mut(dimension).advanced.set_raw(key, text);
        Ok(())
    }

    pub fn set_other_fields_raw(&mut self, text: &str) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        self.other_fields.set_raw(text);
        Ok(())
    }

    /// Add a user-defined key. Returns the normalized key on success.
    pub fn add_custom_key(
        &mut self,
        dimension: Dimension,
        key: &str,
    ) -> Result<String, ComposeError> {
        self.ensure_editing()?;
        let state = self.dimension_mut(dimension);
        let normalized = state
            .registry
            .add(key)
            .map_err(ComposeError::Validation)?;
        state.advanced.init_empty(&normalized);
        Ok(normalized)
    }

    /// Remove a custom key along with its binding and advanced slot.
    pub fn remove_custom_key(
        &mut self,
        dimension: Dimension,
        key: &str,
    ) -> Result<(), ComposeError> {
        self.ensure_editing()?;
        let state = self.dimension_mut(dimension);
        if !state.registry.remove(key) {
            return Err(ComposeError::Validation(format!(
                "'{}' is not a custom {} key",
                key,
                dimension.label()
            )));
        }
        state.bindings.remove(key);
        state.advanced.remove(key);
        Ok(())
    }

    /// Rewrite every binding matching the spec across both dimensions.
    /// Validation happens up front; a valid spec that matches nothing
    /// reports `NoMatch` rather than an error.
    pub fn replace_models(
        &mut self,
        spec: &BatchReplaceSpec,
    ) -> Result<ReplaceOutcome, ComposeError> {
        self.ensure_editing()?;
        replace::validate_spec(spec, &self.models).map_err(ComposeError::Validation)?;

        let mut rewritten = 0usize;
        let mut variants_cleared = 0usize;
        for dimension in [Dimension::Agents, Dimension::Categories] {
            let models = &self.models;
            let state = match dimension {
                Dimension::Agents => &mut self.agents,
                Dimension::Categories => &mut self.categories,
            };
            let keys = state.registry.all_keys();
            let (r, c) = replace::apply_to_bindings(&keys, &mut state.bindings, spec, models);
            rewritten += r;
            variants_cleared += c;
        }

        if rewritten == 0 {
            Ok(ReplaceOutcome::NoMatch)
        } else {
            Ok(ReplaceOutcome::Applied {
                rewritten,
                variants_cleared,
            })
        }
    }

    /// Fold an imported fragment into the session. Only the keys the
    /// fragment carries are touched; a non-empty `otherFields` replaces the
    /// session's extra configuration wholesale.
    pub fn import_fragment(
        &mut self,
        fragment: &ImportFragment,
    ) -> Result<ImportSummary, ComposeError> {
        self.ensure_editing()?;

        let agents_affected = import::fold_dimension(
            Dimension::Agents.label(),
            &fragment.agents,
            &mut self.agents.registry,
            &mut self.agents.bindings,
            &mut self.agents.advanced,
        );
        let categories_affected = import::fold_dimension(
            Dimension::Categories.label(),
            &fragment.categories,
            &mut self.categories.registry,
            &mut self.categories.bindings,
            &mut self.categories.advanced,
        );
        if !fragment.other_fields.is_empty() {
            self.other_fields.seed(fragment.other_fields.clone());
        }

        Ok(ImportSummary {
            agents_affected,
            categories_affected,
        })
    }

    fn compose_dimension(&self, dimension: Dimension) -> Result<Map<String, Value>, ComposeError> {
        let state = self.dimension(dimension);
        let keys = state.registry.all_keys();
        let mut resolved: HashMap<String, Map<String, Value>> = HashMap::new();
        for key in &keys {
            let advanced = state.advanced.resolve(key).map_err(|err| {
                ComposeError::Validation(format!(
                    "Invalid {} advanced settings: {}",
                    dimension.label(),
                    err
                ))
            })?;
            if let Some(advanced) = advanced {
                resolved.insert(key.clone(), advanced);
            }
        }
        Ok(codec::encode_dimension(&keys, &state.bindings, &resolved))
    }

    fn compose(&self) -> Result<ConfigDocument, ComposeError> {
        let agents = self.compose_dimension(Dimension::Agents)?;
        let categories = self.compose_dimension(Dimension::Categories)?;
        let other_fields = self
            .other_fields
            .resolve()
            .map_err(|err| {
                ComposeError::Validation(format!("Invalid extra configuration: {}", err))
            })?
            .unwrap_or_default();

        Ok(ConfigDocument {
            id: self
                .record_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name.clone(),
            agents,
            categories,
            created_at: self.created_at.or_else(|| Some(now_millis())),
            updated_at: Some(now_millis()),
            other_fields,
        })
    }

    /// Validate, compose, and persist the document.
    ///
    /// Validation and persistence failures leave the session in `Editing`
    /// with all state intact so the user can fix the input or retry; a
    /// successful save closes the session.
    pub fn submit(&mut self, store: &dyn ConfigStore) -> Result<ConfigDocument, ComposeError> {
        match self.state {
            SessionState::Editing => {}
            SessionState::Submitting => {
                return Err(ComposeError::Validation(
                    "A submit is already in progress".to_string(),
                ))
            }
            _ => {
                return Err(ComposeError::Validation(
                    "No active edit session".to_string(),
                ))
            }
        }
        self.state = SessionState::Submitting;

        let document = match self.compose() {
            Ok(document) => document,
            Err(err) => {
                self.state = SessionState::Editing;
                return Err(err);
            }
        };
        if let Err(err) = store.save(&document) {
            self.state = SessionState::Editing;
            return Err(ComposeError::Persistence(err));
        }

        self.state = SessionState::Closed;
        Ok(document)
    }
}
