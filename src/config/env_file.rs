// ABOUTME: Env file loading and the immutable environment snapshot.
// ABOUTME: File values fill gaps only; variables already exported always win.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Default env file looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Parsed `KEY=VALUE` entries from an env file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Parse env file content.
    ///
    /// Blank lines and lines starting with `#` are skipped, a leading `export `
    /// is stripped, and one pair of matching surrounding quotes is removed from
    /// the value. Lines without `=` are ignored.
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let line = line.strip_prefix("export ").unwrap_or(line);
                let (key, value) = line.split_once('=')?;
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return None;
                }
                Some((key.to_string(), unquote(value.trim()).to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Load an env file. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::ReadFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read-only view of the environment used for configuration resolution.
///
/// The process environment is captured once and never mutated; env file
/// values are layered underneath it.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Layer env file entries underneath the captured variables.
    ///
    /// Keys already present (even with an empty value) are left untouched.
    pub fn with_env_file(mut self, file: &EnvFile) -> Self {
        for (key, value) in file.entries() {
            self.vars
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Look up a variable, treating blank values as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// First variable in `keys` that is set.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }
}
