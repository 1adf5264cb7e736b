//! Pure merging of configuration documents.
//!
//! [`merge_configs`] layers an extending producer's output over the output of
//! the producer it extends. [`apply_merge_patch`] applies a user override file.

use serde_json::Value;

/// How an array found at a given path is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// `base` items followed by `overlay` items
    Concat,
    /// `overlay` wins
    Replace,
}

/// Dotted paths whose arrays are concatenated rather than replaced.
const CONCAT_PATHS: &[&str] = &[
    "plugins",
    "module.rules",
    "resolve.extensions",
    "resolve.modules",
];

impl MergePolicy {
    pub fn for_path(path: &str) -> Self {
        if CONCAT_PATHS.contains(&path) {
            MergePolicy::Concat
        } else {
            MergePolicy::Replace
        }
    }
}

/// Merge `overlay` over `base`.
///
/// Objects merge key by key. Arrays at `plugins`, `module.rules`,
/// `resolve.extensions` and `resolve.modules` are concatenated; every other
/// array and every scalar is taken from `overlay`.
///
/// # Example
/// ```
/// use packrig_config::merge_configs;
/// use serde_json::json;
///
/// let merged = merge_configs(
///     json!({ "plugins": ["a"], "devtool": "eval" }),
///     json!({ "plugins": ["b"], "devtool": "source-map" }),
/// );
/// assert_eq!(merged, json!({ "plugins": ["a", "b"], "devtool": "source-map" }));
/// ```
pub fn merge_configs(base: Value, overlay: Value) -> Value {
    let mut merged = base;
    merge_at(&mut merged, overlay, "");
    merged
}

fn merge_at(target: &mut Value, update: Value, path: &str) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match target_map.get_mut(&key) {
                    Some(slot) => merge_at(slot, value, &child),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(update_items))
            if MergePolicy::for_path(path) == MergePolicy::Concat =>
        {
            target_items.extend(update_items);
        }
        (target_slot, update) => {
            *target_slot = update;
        }
    }
}

/// Apply a JSON merge patch (RFC 7396): objects merge recursively, `null`
/// removes the key, anything else replaces.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                apply_merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_rules_are_concatenated() {
        let merged = merge_configs(
            json!({ "module": { "rules": [{ "test": "a" }] } }),
            json!({ "module": { "rules": [{ "test": "b" }] } }),
        );
        assert_eq!(merged["module"]["rules"], json!([{ "test": "a" }, { "test": "b" }]));
    }

    #[test]
    fn other_arrays_are_replaced() {
        let merged = merge_configs(
            json!({ "entry": { "main": ["a.js"] } }),
            json!({ "entry": { "main": ["b.js"] } }),
        );
        assert_eq!(merged["entry"]["main"], json!(["b.js"]));
    }

    #[test]
    fn unspecified_fields_are_preserved() {
        let merged = merge_configs(
            json!({ "resolve": { "extensions": [".js"] }, "target": "web" }),
            json!({ "mode": "production" }),
        );
        assert_eq!(merged["resolve"]["extensions"], json!([".js"]));
        assert_eq!(merged["target"], "web");
        assert_eq!(merged["mode"], "production");
    }

    #[test]
    fn plugins_keep_base_first() {
        let merged = merge_configs(json!({ "plugins": [1, 2] }), json!({ "plugins": [3] }));
        assert_eq!(merged["plugins"], json!([1, 2, 3]));
    }

    #[test]
    fn merge_patch_removes_null_keys() {
        let mut target = json!({ "devtool": "eval", "output": { "path": "dist", "publicPath": "/" } });
        apply_merge_patch(
            &mut target,
            &json!({ "devtool": null, "output": { "publicPath": "/static/" } }),
        );
        assert_eq!(
            target,
            json!({ "output": { "path": "dist", "publicPath": "/static/" } })
        );
    }

    #[test]
    fn merge_patch_replaces_arrays() {
        let mut target = json!({ "plugins": [1, 2, 3] });
        apply_merge_patch(&mut target, &json!({ "plugins": [] }));
        assert_eq!(target, json!({ "plugins": [] }));
    }
}
