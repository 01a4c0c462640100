use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::secrets::{resolve_placeholders, SecretResolver};
use super::ConfigError;

/// Load and parse a YAML file. A missing file yields `None`.
pub(crate) fn load_yaml_file(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
    load_yaml_str(&content).map(Some)
}

pub(crate) fn load_yaml_str(content: &str) -> Result<Value, ConfigError> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}

/// Deep-merge `overlay` into `base`. Mappings merge key by key; anything
/// else in the overlay replaces the base value.
pub(crate) fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Resolve `${...}` placeholders in every string leaf.
pub(crate) fn resolve_strings(
    value: &mut Value,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    match value {
        Value::String(s) if s.contains("${") => {
            *s = resolve_placeholders(s, resolver)?;
        }
        Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                resolve_strings(v, resolver)?;
            }
        }
        Value::Sequence(seq) => {
            for v in seq.iter_mut() {
                resolve_strings(v, resolver)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Overlay environment variables carrying `prefix`.
///
/// Convention: `RESTED__SESSION__TTL_SECS` <-> `session.ttl_secs`. Values are
/// parsed as YAML scalars so numbers and booleans keep their type.
pub(crate) fn overlay_env<I>(root: &mut Value, prefix: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw) in vars {
        let Some(path) = key.strip_prefix(prefix) else {
            continue;
        };
        let segments: Vec<String> = path
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        let parsed = serde_yaml::from_str::<Value>(&raw).unwrap_or(Value::String(raw.clone()));
        let scalar = match parsed {
            Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_) => Value::String(raw),
            other => other,
        };
        set_path(root, &segments, scalar);
    }
}

fn set_path(root: &mut Value, segments: &[String], leaf: Value) {
    let mut current = root;
    for segment in segments {
        if !current.is_mapping() {
            *current = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = current else {
            unreachable!("current was just made a mapping");
        };
        current = map
            .entry(Value::String(segment.clone()))
            .or_insert(Value::Null);
    }
    *current = leaf;
}

/// Walk a dot-separated key through the YAML tree.
pub(crate) fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return Some(root);
    }
    key.split('.').try_fold(root, |node, segment| match node {
        Value::Mapping(map) => map.get(segment),
        Value::Sequence(seq) => segment.parse::<usize>().ok().and_then(|i| seq.get(i)),
        _ => None,
    })
}
