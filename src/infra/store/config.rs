use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::StoreError;

const CONFIG_TEMPLATE: &str = "\
# Configuration file for flux
# Values can be set either by directly modifying the file or from the Settings view.
#
# user_name  =
# user_email =
# origin =
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigField {
    UserName,
    UserEmail,
    Origin,
}

impl FromStr for ConfigField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_name" => Ok(ConfigField::UserName),
            "user_email" => Ok(ConfigField::UserEmail),
            "origin" => Ok(ConfigField::Origin),
            other => Err(StoreError::UnsupportedField(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigField::UserName => "user_name",
            ConfigField::UserEmail => "user_email",
            ConfigField::Origin => "origin",
        };
        write!(f, "{s}")
    }
}

/// Repository-local configuration, persisted as TOML.
///
/// Entries other than the known string fields are carried through rewrites
/// untouched.
#[derive(Debug)]
pub struct RepoConfig {
    path: PathBuf,
    values: BTreeMap<ConfigField, String>,
    other: toml::Table,
}

impl RepoConfig {
    pub fn init(path: &Path) -> Result<Self, StoreError> {
        fs::write(path, CONFIG_TEMPLATE).map_err(|e| StoreError::write(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            values: BTreeMap::new(),
            other: toml::Table::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::read(path, e))?;
        let raw: toml::Table = toml::from_str(&contents).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut values = BTreeMap::new();
        let mut other = toml::Table::new();
        for (key, value) in raw {
            match (key.parse::<ConfigField>(), value) {
                (Ok(field), toml::Value::String(value)) => {
                    values.insert(field, value);
                }
                (Ok(field), value) => {
                    log::debug!("ignoring non-string value for '{field}': {value}");
                }
                (Err(_), value) => {
                    log::debug!("ignoring unknown config key '{key}'");
                    other.insert(key, value);
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            values,
            other,
        })
    }

    pub fn get(&self, field: ConfigField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Stores `value` and rewrites the file atomically.
    pub fn set(&mut self, field: ConfigField, value: &str) -> Result<(), StoreError> {
        self.values.insert(field, value.to_string());

        let mut table = self.other.clone();
        for (field, value) in &self.values {
            table.insert(field.to_string(), toml::Value::String(value.clone()));
        }
        let contents = toml::to_string(&table).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, contents).map_err(|e| StoreError::write(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::write(&self.path, e))
    }
}
