//! Environments and their variables

use serde::{Deserialize, Serialize};

/// A single `key = value` variable of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Server-assigned identifier.
    pub id: String,
    /// Variable name used in `{{key}}` templates.
    pub key: String,
    /// Substituted value.
    #[serde(default)]
    pub value: String,
}

impl Variable {
    /// Creates a new variable.
    #[must_use]
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Server-assigned identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Variables in declaration order.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Environment {
    /// Creates an environment without variables.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            variables: Vec::new(),
        }
    }

    /// Looks up a variable value by key.
    ///
    /// When the same key is declared more than once the last one wins.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .rev()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Returns true if another variable (not `except_id`) already uses `key`.
    #[must_use]
    pub fn key_taken(&self, key: &str, except_id: Option<&str>) -> bool {
        self.variables
            .iter()
            .any(|v| v.key == key && Some(v.id.as_str()) != except_id)
    }

    /// Returns the variable with the given id.
    #[must_use]
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }
}
