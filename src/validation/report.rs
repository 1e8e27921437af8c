use serde_json::Value;

use super::error::ConfigError;

/// Stable symbolic identifier for a validation failure.
pub type Code = &'static str;

/// Ordered collection of validation failure messages keyed by code.
///
/// Entries keep the order in which checks were performed. Recording the same
/// code twice overwrites the message in place; two entries that render to the
/// same message text collapse into one when the report is read. A report is
/// built fresh for every validation call, so no state leaks between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<(Code, String)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure message under `code`, overwriting any earlier entry
    /// with the same code while keeping its position.
    pub fn record(&mut self, code: Code, message: String) {
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((code, message)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries after duplicate messages have collapsed.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| *c == code)
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, m)| m.as_str())
    }

    /// Iterates entries in insertion order, skipping any entry whose message
    /// text duplicates an earlier one.
    pub fn iter(&self) -> impl Iterator<Item = (Code, &str)> {
        let mut seen: Vec<&str> = Vec::new();
        self.entries.iter().filter_map(move |(code, message)| {
            if seen.contains(&message.as_str()) {
                None
            } else {
                seen.push(message.as_str());
                Some((*code, message.as_str()))
            }
        })
    }
}

/// Message templates for one validator family.
///
/// Templates are looked up by code, optionally overridden per code at
/// construction time, and rendered by interpolating `%value%` and any named
/// variables the caller supplies. When value obscuring is enabled every
/// interpolated variable is replaced by `*` repeated to its length.
#[derive(Debug, Clone)]
pub struct Templates {
    defaults: &'static [(Code, &'static str)],
    overrides: Vec<(Code, String)>,
    value_obscured: bool,
}

impl Templates {
    pub fn new(defaults: &'static [(Code, &'static str)]) -> Self {
        Self {
            defaults,
            overrides: Vec::new(),
            value_obscured: false,
        }
    }

    pub fn set_value_obscured(&mut self, obscured: bool) {
        self.value_obscured = obscured;
    }

    pub fn value_obscured(&self) -> bool {
        self.value_obscured
    }

    /// Replaces the template for `key`. Unknown keys are a configuration
    /// error so that typos surface at construction, not silently at runtime.
    pub fn set_message(&mut self, key: &str, template: &str) -> Result<(), ConfigError> {
        let code = self
            .defaults
            .iter()
            .map(|(c, _)| *c)
            .find(|c| *c == key)
            .ok_or_else(|| ConfigError::UnknownMessageKey(key.to_string()))?;
        match self.overrides.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = template.to_string(),
            None => self.overrides.push((code, template.to_string())),
        }
        Ok(())
    }

    pub fn knows(&self, key: &str) -> bool {
        self.defaults.iter().any(|(c, _)| *c == key)
    }

    /// Renders the template for `code`, substituting `%value%` and each
    /// `(name, value)` pair given in `vars` as `%name%`.
    pub fn render(&self, code: Code, value: &str, vars: &[(&str, &str)]) -> String {
        let template = self
            .overrides
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, t)| t.as_str())
            .or_else(|| {
                self.defaults
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, t)| *t)
            })
            .unwrap_or(code);

        let mut message = template.replace("%value%", &self.obscure(value));
        for (name, var) in vars {
            message = message.replace(&format!("%{name}%"), &self.obscure(var));
        }
        message
    }

    fn obscure(&self, value: &str) -> String {
        if self.value_obscured {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        }
    }
}

/// Plain-text rendering of an arbitrary JSON input for interpolation into
/// failure messages. Strings render verbatim; everything else renders as its
/// JSON form so a wrong-type message still shows what was received.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
