//! Hierarchical key -> string configuration store.
//!
//! Grounded in `sprokit::config` (`original_source/src/sprokit/pipeline/config.h`):
//! a `subblock` is an independent copy, a `subblock_view` is a live,
//! writable window into the parent holding only a weak reference, and
//! individual keys can be locked read-only.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{Error, Result};

pub const BLOCK_SEP: char = ':';

struct Inner {
    store: HashMap<String, String>,
    ro: HashSet<String>,
}

impl Inner {
    fn new() -> Self {
        Inner { store: HashMap::new(), ro: HashSet::new() }
    }
}

enum Backing {
    Owned(Arc<Mutex<Inner>>),
    View { parent: Weak<Mutex<Inner>>, prefix: String },
}

/// A hierarchical, optionally read-only-locked configuration block.
pub struct ConfigBlock {
    name: String,
    backing: Backing,
}

impl Clone for ConfigBlock {
    fn clone(&self) -> Self {
        ConfigBlock {
            name: self.name.clone(),
            backing: match &self.backing {
                Backing::Owned(arc) => Backing::Owned(arc.clone()),
                Backing::View { parent, prefix } => {
                    Backing::View { parent: parent.clone(), prefix: prefix.clone() }
                }
            },
        }
    }
}

impl ConfigBlock {
    /// Creates a fresh, empty root block with the given symbolic name.
    pub fn empty(name: impl Into<String>) -> Self {
        ConfigBlock {
            name: name.into(),
            backing: Backing::Owned(Arc::new(Mutex::new(Inner::new()))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, key: &str) -> Result<(Arc<Mutex<Inner>>, String)> {
        match &self.backing {
            Backing::Owned(arc) => Ok((arc.clone(), key.to_string())),
            Backing::View { parent, prefix } => {
                let arc = parent
                    .upgrade()
                    .ok_or_else(|| Error::NoSuchConfigurationValue(key.to_string()))?;
                let full = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}{BLOCK_SEP}{key}")
                };
                Ok((arc, full))
            }
        }
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let (arc, full_key) = self.resolve(key)?;
        let mut inner = arc.lock().expect("config store poisoned");
        if inner.ro.contains(&full_key) {
            return Err(Error::SetOnReadOnly(full_key));
        }
        inner.store.insert(full_key, value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let (arc, full_key) = self.resolve(key)?;
        let inner = arc.lock().expect("config store poisoned");
        inner
            .store
            .get(&full_key)
            .cloned()
            .ok_or(Error::NoSuchConfigurationValue(full_key))
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Parses the stored string into `T`; `bool` recognizes
    /// `true/false/1/0` case-insensitively, other types use `FromStr`.
    pub fn get_as<T: FromConfigValue>(&self, key: &str) -> Result<T> {
        let raw = self.get(key)?;
        T::from_config_value(&raw).ok_or_else(|| Error::BadConfigurationCast {
            key: key.to_string(),
            value: raw,
            target: std::any::type_name::<T>(),
        })
    }

    /// Returns `default` on any failure (missing key or bad cast).
    pub fn get_as_or<T: FromConfigValue>(&self, key: &str, default: T) -> T {
        self.get_as(key).unwrap_or(default)
    }

    pub fn unset(&self, key: &str) -> Result<()> {
        let (arc, full_key) = self.resolve(key)?;
        let mut inner = arc.lock().expect("config store poisoned");
        if inner.ro.contains(&full_key) {
            return Err(Error::UnsetOnReadOnly(full_key));
        }
        inner
            .store
            .remove(&full_key)
            .map(|_| ())
            .ok_or(Error::NoSuchConfigurationValue(full_key))
    }

    pub fn mark_read_only(&self, key: &str) {
        let (arc, full_key) = match self.resolve(key) {
            Ok(pair) => pair,
            Err(_) => return,
        };
        let mut inner = arc.lock().expect("config store poisoned");
        inner.ro.insert(full_key);
    }

    pub fn is_read_only(&self, key: &str) -> bool {
        match self.resolve(key) {
            Ok((arc, full_key)) => arc.lock().expect("config store poisoned").ro.contains(&full_key),
            Err(_) => false,
        }
    }

    fn entries_under_prefix(&self, prefix: &str) -> Result<Vec<(String, String, bool)>> {
        let (arc, full_prefix) = self.resolve(prefix)?;
        let inner = arc.lock().expect("config store poisoned");
        let lead = format!("{full_prefix}{BLOCK_SEP}");
        let mut out = Vec::new();
        for (k, v) in inner.store.iter() {
            if let Some(suffix) = k.strip_prefix(&lead) {
                out.push((suffix.to_string(), v.clone(), inner.ro.contains(k)));
            }
        }
        Ok(out)
    }

    /// An independent copy of every key under `prefix`.
    pub fn subblock(&self, prefix: &str) -> Result<ConfigBlock> {
        let entries = self.entries_under_prefix(prefix)?;
        let mut store = HashMap::new();
        let mut ro = HashSet::new();
        for (suffix, value, is_ro) in entries {
            if is_ro {
                ro.insert(suffix.clone());
            }
            store.insert(suffix, value);
        }
        Ok(ConfigBlock {
            name: prefix.to_string(),
            backing: Backing::Owned(Arc::new(Mutex::new(Inner { store, ro }))),
        })
    }

    /// A live, writable view into this block at `prefix`. Reads fall
    /// through to the parent; writes reflect back to it. Holds only a
    /// weak reference: once the ultimate owning root is dropped, every
    /// operation fails with `no_such_configuration_value`.
    pub fn subblock_view(&self, prefix: &str) -> ConfigBlock {
        let (parent, base) = match &self.backing {
            Backing::Owned(arc) => (Arc::downgrade(arc), String::new()),
            Backing::View { parent, prefix: existing } => (parent.clone(), existing.clone()),
        };
        let full_prefix = if base.is_empty() {
            prefix.to_string()
        } else {
            format!("{base}{BLOCK_SEP}{prefix}")
        };
        ConfigBlock {
            name: prefix.to_string(),
            backing: Backing::View { parent, prefix: full_prefix },
        }
    }

    pub fn available_values(&self) -> Result<Vec<String>> {
        match &self.backing {
            Backing::Owned(arc) => {
                let inner = arc.lock().expect("config store poisoned");
                Ok(inner.store.keys().cloned().collect())
            }
            Backing::View { parent, prefix } => {
                let arc = parent
                    .upgrade()
                    .ok_or_else(|| Error::NoSuchConfigurationValue(prefix.clone()))?;
                let inner = arc.lock().expect("config store poisoned");
                let lead = format!("{prefix}{BLOCK_SEP}");
                Ok(inner
                    .store
                    .keys()
                    .filter_map(|k| k.strip_prefix(&lead).map(str::to_string))
                    .collect())
            }
        }
    }

    /// Copies every key from `other` into self, overwriting, but
    /// respects read-only locks on self.
    pub fn merge(&self, other: &ConfigBlock) -> Result<()> {
        for key in other.available_values()? {
            let value = other.get(&key)?;
            self.set(&key, value)?;
        }
        Ok(())
    }

    pub fn print(&self) -> String {
        let mut keys = self.available_values().unwrap_or_default();
        keys.sort();
        let mut out = format!("config[{}]:\n", self.name);
        for k in keys {
            if let Ok(v) = self.get(&k) {
                out.push_str(&format!("  {k} = {v}\n"));
            }
        }
        out
    }
}

/// Custom string parsing for configuration values; `bool` special-cases
/// `true/false/1/0`, everything else defers to `FromStr`.
pub trait FromConfigValue: Sized {
    fn from_config_value(s: &str) -> Option<Self>;
}

impl FromConfigValue for bool {
    fn from_config_value(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromConfigValue for String {
    fn from_config_value(s: &str) -> Option<Self> {
        Some(s.to_string())
    }
}

macro_rules! impl_from_config_value_via_fromstr {
    ($($t:ty),* $(,)?) => {
        $(impl FromConfigValue for $t {
            fn from_config_value(s: &str) -> Option<Self> {
                <$t as FromStr>::from_str(s).ok()
            }
        })*
    };
}

impl_from_config_value_via_fromstr!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_round_trip() {
        let c = ConfigBlock::empty("root");
        c.set("a:b", "42").unwrap();
        assert_eq!(c.get("a:b").unwrap(), "42");
        assert_eq!(c.get_as::<i32>("a:b").unwrap(), 42);
    }

    #[test]
    fn missing_key_fails() {
        let c = ConfigBlock::empty("root");
        assert!(matches!(c.get("nope"), Err(Error::NoSuchConfigurationValue(_))));
    }

    #[test]
    fn bool_recognizes_aliases_case_insensitively() {
        let c = ConfigBlock::empty("root");
        c.set("flag", "TRUE").unwrap();
        assert!(c.get_as::<bool>("flag").unwrap());
        c.set("flag", "0").unwrap();
        assert!(!c.get_as::<bool>("flag").unwrap());
    }

    #[test]
    fn get_as_or_falls_back_on_any_failure() {
        let c = ConfigBlock::empty("root");
        assert_eq!(c.get_as_or::<i32>("missing", 7), 7);
        c.set("bad", "not-a-number").unwrap();
        assert_eq!(c.get_as_or::<i32>("bad", 7), 7);
    }

    #[test]
    fn read_only_blocks_set_and_unset() {
        let c = ConfigBlock::empty("root");
        c.set("k", "v").unwrap();
        c.mark_read_only("k");
        assert!(matches!(c.set("k", "v2"), Err(Error::SetOnReadOnly(_))));
        assert!(matches!(c.unset("k"), Err(Error::UnsetOnReadOnly(_))));
    }

    #[test]
    fn subblock_is_an_independent_copy() {
        let c = ConfigBlock::empty("root");
        c.set("a:x", "1").unwrap();
        let sub = c.subblock("a").unwrap();
        sub.set("x", "2").unwrap();
        assert_eq!(c.get("a:x").unwrap(), "1");
        assert_eq!(sub.get("x").unwrap(), "2");
    }

    #[test]
    fn subblock_view_writes_reflect_to_parent() {
        let c = ConfigBlock::empty("root");
        c.set("a:x", "1").unwrap();
        let view = c.subblock_view("a");
        assert_eq!(view.get("x").unwrap(), "1");
        view.set("x", "2").unwrap();
        assert_eq!(c.get("a:x").unwrap(), "2");
    }

    #[test]
    fn subblock_view_fails_once_parent_dropped() {
        let view = {
            let c = ConfigBlock::empty("root");
            c.set("a:x", "1").unwrap();
            c.subblock_view("a")
        };
        assert!(matches!(view.get("x"), Err(Error::NoSuchConfigurationValue(_))));
    }

    #[test]
    fn merge_overwrites_but_respects_read_only() {
        let a = ConfigBlock::empty("a");
        a.set("k", "1").unwrap();
        a.mark_read_only("k");
        a.set("other", "x").unwrap();

        let b = ConfigBlock::empty("b");
        b.set("k", "2").unwrap();
        b.set("other", "y").unwrap();

        assert!(matches!(a.merge(&b), Err(Error::SetOnReadOnly(_))));
    }
}
