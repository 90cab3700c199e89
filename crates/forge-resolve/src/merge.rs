//! Override merge engine
//!
//! Applies the four-level precedence chain over a profile's blocks:
//!
//! 1. Profile default
//! 2. Profile per-environment override
//! 3. Service-level override
//! 4. Service+environment override
//!
//! Mappings merge recursively; scalars and sequences are replaced
//! wholesale by the higher-precedence layer. The cost domain has two
//! kinds of values: structures follow the replace rule, quantities
//! (budgets) combine multiplicatively and are computed out-of-band in
//! [`resolve_budgets`].

use std::collections::BTreeMap;

use forge_catalog::{OverrideBlock, ProfileTemplate};
use serde_yaml::{Mapping, Value};

/// Deep merge `overlay` into `base`.
///
/// If both sides hold a mapping, recurse per key; otherwise the overlay
/// value replaces the base value wholesale. Sequences are never
/// concatenated or element-merged.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// The four precedence layers for one (profile, service, environment).
///
/// Layers are optional; a missing layer simply contributes nothing.
pub fn precedence_layers<'a>(
    template: &'a ProfileTemplate,
    overrides: &'a OverrideBlock,
    environment: &str,
) -> [Option<&'a Value>; 4] {
    [
        template.defaults.as_ref(),
        template.for_environment(environment),
        overrides.defaults.as_ref(),
        overrides.for_environment(environment),
    ]
}

/// Merge the precedence chain into one block.
///
/// `multiplier` and `budgets` keys are stripped from the result: both
/// belong to the quantity domain handled by [`resolve_budgets`], and
/// neither survives into the merged structural block.
pub fn resolve_block(
    template: &ProfileTemplate,
    overrides: &OverrideBlock,
    environment: &str,
) -> Value {
    let mut merged = Value::Mapping(Mapping::new());
    for layer in precedence_layers(template, overrides, environment)
        .into_iter()
        .flatten()
    {
        deep_merge(&mut merged, layer);
    }

    if let Value::Mapping(map) = &mut merged {
        map.remove("multiplier");
        map.remove("budgets");
    }

    merged
}

/// Compute the scaled budget table for one service.
///
/// Every environment's base quantity from the profile defaults is
/// multiplied by the size multiplier first, then by each override
/// layer's `multiplier` in ascending precedence order. Override layers
/// scale the running total; they never replace it. Environments other
/// than the tuple's own are scaled with their respective layers so the
/// resulting table stays comparable for the monotonicity check.
pub fn resolve_budgets(
    template: &ProfileTemplate,
    overrides: &OverrideBlock,
    size_multiplier: f64,
) -> BTreeMap<String, f64> {
    let mut budgets = BTreeMap::new();

    let Some(Value::Mapping(defaults)) = template.defaults.as_ref() else {
        return budgets;
    };
    let Some(Value::Mapping(base_budgets)) = defaults.get("budgets") else {
        return budgets;
    };

    for (env_key, base) in base_budgets {
        let (Some(env), Some(base)) = (env_key.as_str(), as_f64(base)) else {
            continue;
        };

        let mut total = base * size_multiplier;
        for layer in [
            template.for_environment(env),
            overrides.defaults.as_ref(),
            overrides.for_environment(env),
        ]
        .into_iter()
        .flatten()
        {
            if let Some(m) = layer_multiplier(layer) {
                total *= m;
            }
        }

        budgets.insert(env.to_string(), total);
    }

    budgets
}

fn layer_multiplier(layer: &Value) -> Option<f64> {
    let Value::Mapping(map) = layer else {
        return None;
    };
    as_f64(map.get("multiplier")?)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
