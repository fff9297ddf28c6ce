//! Pipeline description file loading into a root [`ConfigBlock`].
//!
//! Adapted from the teacher's `config::loader::load_config`
//! (`toml::from_str` over a typed struct); here the target shape is a
//! flat key-value store, so nested tables are flattened into
//! `:`-joined keys instead of deserializing into a fixed struct. JSON
//! is accepted alongside TOML (selected by file extension) since the
//! teacher's own ambient stack carries `serde_json` as well.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use toml::Value as TomlValue;

use crate::config::block::{ConfigBlock, BLOCK_SEP};
use crate::error::{Error, Result};

/// Loads `path` as TOML, unless its extension is `.json`, in which
/// case it's parsed as JSON instead.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConfigBlock> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::NoSuchConfigurationValue(format!("{}: {e}", path.as_ref().display()))
    })?;
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some("json") => load_config_from_json_string(&text),
        _ => load_config_from_string(&text),
    }
}

pub fn load_config_from_string(text: &str) -> Result<ConfigBlock> {
    let value: TomlValue = text.parse().map_err(|e| Error::BadConfigurationCast {
        key: String::new(),
        value: format!("{e}"),
        target: "toml",
    })?;
    let root = ConfigBlock::empty("root");
    flatten_toml_into(&root, None, &value)?;
    Ok(root)
}

pub fn load_config_from_json_string(text: &str) -> Result<ConfigBlock> {
    let value: JsonValue = serde_json::from_str(text).map_err(|e| Error::BadConfigurationCast {
        key: String::new(),
        value: format!("{e}"),
        target: "json",
    })?;
    let root = ConfigBlock::empty("root");
    flatten_json_into(&root, None, &value)?;
    Ok(root)
}

fn flatten_toml_into(block: &ConfigBlock, prefix: Option<&str>, value: &TomlValue) -> Result<()> {
    match value {
        TomlValue::Table(table) => {
            for (k, v) in table {
                let full = match prefix {
                    Some(p) => format!("{p}{BLOCK_SEP}{k}"),
                    None => k.clone(),
                };
                flatten_toml_into(block, Some(&full), v)?;
            }
            Ok(())
        }
        TomlValue::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                let full = match prefix {
                    Some(p) => format!("{p}{BLOCK_SEP}{i}"),
                    None => i.to_string(),
                };
                flatten_toml_into(block, Some(&full), v)?;
            }
            Ok(())
        }
        scalar => {
            let key = prefix.unwrap_or_default();
            block.set(key, scalar_to_toml_string(scalar))
        }
    }
}

fn scalar_to_toml_string(value: &TomlValue) -> String {
    match value {
        TomlValue::String(s) => s.clone(),
        TomlValue::Integer(i) => i.to_string(),
        TomlValue::Float(f) => f.to_string(),
        TomlValue::Boolean(b) => b.to_string(),
        TomlValue::Datetime(dt) => dt.to_string(),
        _ => String::new(),
    }
}

fn flatten_json_into(block: &ConfigBlock, prefix: Option<&str>, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Object(map) => {
            for (k, v) in map {
                let full = match prefix {
                    Some(p) => format!("{p}{BLOCK_SEP}{k}"),
                    None => k.clone(),
                };
                flatten_json_into(block, Some(&full), v)?;
            }
            Ok(())
        }
        JsonValue::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                let full = match prefix {
                    Some(p) => format!("{p}{BLOCK_SEP}{i}"),
                    None => i.to_string(),
                };
                flatten_json_into(block, Some(&full), v)?;
            }
            Ok(())
        }
        JsonValue::Null => Ok(()),
        scalar => {
            let key = prefix.unwrap_or_default();
            block.set(key, scalar_to_json_string(scalar))
        }
    }
}

fn scalar_to_json_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_nested_tables_with_block_separator() {
        let cfg = load_config_from_string(
            r#"
            [_pipeline._edge]
            capacity = 32
            blocking = true

            [up1]
            type = "numbers"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.get("_pipeline:_edge:capacity").unwrap(), "32");
        assert!(cfg.get_as::<bool>("_pipeline:_edge:blocking").unwrap());
        assert_eq!(cfg.get("up1:type").unwrap(), "numbers");
    }

    #[test]
    fn flattens_json_objects_with_block_separator() {
        let cfg = load_config_from_json_string(
            r#"{
                "_pipeline": {"_edge": {"capacity": 32, "blocking": true}},
                "up1": {"type": "numbers"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.get("_pipeline:_edge:capacity").unwrap(), "32");
        assert!(cfg.get_as::<bool>("_pipeline:_edge:blocking").unwrap());
        assert_eq!(cfg.get("up1:type").unwrap(), "numbers");
    }
}
