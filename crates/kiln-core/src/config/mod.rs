//! JSON-backed engine configuration.
//!
//! One `Config` instance per context; nothing here is global. Reads are
//! type-strict and never fail: a missing key or a value of the wrong JSON
//! type yields the zero value for the requested type, so call sites stay
//! free of per-key error plumbing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Flat key/value store persisted as a single JSON object.
pub struct Config {
    path: PathBuf,
    values: Map<String, Value>,
    dirty: bool,
}

impl Config {
    /// Creates an empty config that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Map::new(),
            dirty: false,
        }
    }

    /// Loads `path`, falling back to an empty config when the file is
    /// missing or unreadable. Absence is normal on first run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(path);
        config.reload();
        config
    }

    /// Re-reads the backing file, discarding in-memory changes.
    pub fn reload(&mut self) {
        self.values = match fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("config {} is not a JSON object, ignoring", self.path.display());
                    Map::new()
                }
                Err(err) => {
                    log::warn!("config {} failed to parse: {err}", self.path.display());
                    Map::new()
                }
            },
            Err(_) => {
                log::debug!("config {} not found, starting empty", self.path.display());
                Map::new()
            }
        };
        self.dirty = false;
    }

    /// Writes the config as pretty-printed JSON and clears the dirty flag.
    pub fn save(&mut self) -> Result<()> {
        let text = serde_json::to_string_pretty(&Value::Object(self.values.clone()))
            .context("serializing config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing config {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a set has not yet been saved.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn get_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(value)) => *value,
            _ => false,
        }
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
            _ => 0,
        }
    }

    /// Integer-typed JSON values do not convert; only floats count.
    pub fn get_f64(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(Value::Number(number)) if number.is_f64() => number.as_f64().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn get_str(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(value)) => value.clone(),
            _ => String::new(),
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.insert(key, Value::Bool(value));
    }

    pub fn set_i64(&mut self, key: &str, value: i64) {
        self.insert(key, Value::from(value));
    }

    pub fn set_f64(&mut self, key: &str, value: f64) {
        self.insert(key, Value::from(value));
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Value::String(value.into()));
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }
}
