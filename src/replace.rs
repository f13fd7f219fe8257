use std::collections::HashMap;

use crate::catalog::ModelCatalog;
use crate::types::{BatchReplaceSpec, ModelBinding};

/// Check a replacement spec before anything is mutated. A spec that fails
/// here is a user error; a spec that passes can at worst match nothing.
pub(crate) fn validate_spec(spec: &BatchReplaceSpec, models: &ModelCatalog) -> Result<(), String> {
    let from_model = spec.from_model.trim();
    let to_model = spec.to_model.trim();
    if from_model.is_empty() || to_model.is_empty() {
        return Err("Both source and target models must be selected".to_string());
    }
    if from_model == to_model {
        return Err("Source and target models are the same".to_string());
    }
    if let Some(variant) = spec.from_variant.as_deref() {
        if !models.supports_variant(from_model, variant) {
            return Err(format!(
                "Variant '{}' is not available for model '{}'",
                variant, from_model
            ));
        }
    }
    if let Some(variant) = spec.to_variant.as_deref() {
        if !models.supports_variant(to_model, variant) {
            return Err(format!(
                "Variant '{}' is not available for model '{}'",
                variant, to_model
            ));
        }
    }
    Ok(())
}

/// Rewrite matching bindings for one dimension. Returns how many bindings
/// were rewritten and how many variants had to be cleared because the target
/// model does not support them.
pub(crate) fn apply_to_bindings(
    keys: &[String],
    bindings: &mut HashMap<String, ModelBinding>,
    spec: &BatchReplaceSpec,
    models: &ModelCatalog,
) -> (usize, usize) {
    let from_model = spec.from_model.trim();
    let to_model = spec.to_model.trim();
    let mut rewritten = 0usize;
    let mut variants_cleared = 0usize;

    for key in keys {
        let Some(binding) = bindings.get_mut(key) else {
            continue;
        };
        if binding.model.as_deref() != Some(from_model) {
            continue;
        }
        // A spec that names a source variant only matches bindings carrying
        // exactly that variant; a missing variant never matches it.
        if let Some(from_variant) = spec.from_variant.as_deref() {
            if binding.variant.as_deref() != Some(from_variant) {
                continue;
            }
        }

        binding.model = Some(to_model.to_string());
        rewritten += 1;

        match spec.to_variant.as_deref() {
            Some(to_variant) => {
                binding.variant = Some(to_variant.to_string());
            }
            None => {
                if let Some(current) = binding.variant.as_deref() {
                    if !models.supports_variant(to_model, current) {
                        binding.variant = None;
                        variants_cleared += 1;
                    }
                }
            }
        }
    }

    (rewritten, variants_cleared)
}
