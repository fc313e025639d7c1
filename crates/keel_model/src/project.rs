//! The project being built.
//!
//! A [`Project`] carries the descriptor-level metadata (name, version, default
//! tasks and so on) and a map of properties. Properties hold JSON values so
//! that overrides and plugins can store booleans, numbers and strings alike.
//!
//! String properties and arbitrary text can reference other properties:
//!
//! | Syntax    | Meaning                                 |
//! |-----------|-----------------------------------------|
//! | `$name`   | value of property `name`                |
//! | `${name}` | same, for use directly before letters   |
//! | `$$`      | a literal `$`                           |
//!
//! Referenced string properties are themselves expanded.
//!
//! # Example
//!
//! ```
//! use keel_model::project::Project;
//!
//! let mut project = Project::new("/work/app");
//! project.set_property("dir_target", "target");
//! project.set_property("dir_reports", "$dir_target/reports");
//!
//! assert_eq!(project.expand("${dir_reports}_old").unwrap(), "target/reports_old");
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::PropertyError;
use crate::name::is_valid_name;

/// Version assigned to projects whose descriptor does not set one.
pub const DEFAULT_VERSION: &str = "0.1.0";

/// The project under build.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project name; defaults to the base directory's final component.
    pub name: String,
    /// Project version.
    pub version: String,
    /// Tasks built when none are requested.
    pub default_tasks: Vec<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Project authors.
    pub authors: Vec<String>,
    /// License identifier.
    pub license: Option<String>,
    /// Project home page.
    pub url: Option<String>,
    basedir: PathBuf,
    properties: BTreeMap<String, Value>,
}

impl Project {
    /// Creates a project rooted at `basedir`.
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        let basedir = basedir.into();
        let name = basedir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            version: DEFAULT_VERSION.to_owned(),
            default_tasks: Vec::new(),
            summary: None,
            description: None,
            authors: Vec::new(),
            license: None,
            url: None,
            basedir,
            properties: BTreeMap::new(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    // ─────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the value of a property.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns a string property, or `None` if unset or not a string.
    #[must_use]
    pub fn get_property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// Returns the value of a property, or `default` if it is unset.
    #[must_use]
    pub fn get_property_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.properties
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Sets a property, returning the previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(name.into(), value.into())
    }

    /// Sets a property only if it has no value yet.
    ///
    /// Returns `true` if the value was stored.
    pub fn set_property_if_unset(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return false;
        }
        self.properties.insert(name, value.into());
        true
    }

    /// Returns `true` if the property is set.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterates over all properties ordered by name.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────

    /// Substitutes property references in `text`.
    ///
    /// Non-string values are rendered as JSON (`true`, `3`, ...). A `$` that
    /// does not start a reference (`$` before a digit, a symbol or the end of
    /// the text) is kept as is.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::Undefined`] for a reference to an unset property
    /// - [`PropertyError::InvalidPlaceholder`] for an unterminated or malformed
    ///   `${...}` reference
    /// - [`PropertyError::Recursive`] if a property refers back to itself
    pub fn expand(&self, text: &str) -> Result<String, PropertyError> {
        self.expand_inner(text, &mut Vec::new())
    }

    /// Expands each of `parts` and joins them onto the base directory.
    ///
    /// # Errors
    ///
    /// Same as [`expand`](Self::expand).
    pub fn expand_path(&self, parts: &[&str]) -> Result<PathBuf, PropertyError> {
        let mut path = self.basedir.clone();
        for part in parts {
            path.push(self.expand(part)?);
        }
        Ok(path)
    }

    fn expand_inner(&self, text: &str, stack: &mut Vec<String>) -> Result<String, PropertyError> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            let name = match chars.peek().copied() {
                Some((_, '$')) => {
                    chars.next();
                    out.push('$');
                    continue;
                }
                Some((_, '{')) => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => name.push(c),
                            None => return Err(PropertyError::InvalidPlaceholder(offset)),
                        }
                    }
                    if !is_valid_name(&name) {
                        return Err(PropertyError::InvalidPlaceholder(offset));
                    }
                    name
                }
                Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {
                    let mut name = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if !(c.is_ascii_alphanumeric() || c == '_') {
                            break;
                        }
                        name.push(c);
                        chars.next();
                    }
                    name
                }
                _ => {
                    out.push('$');
                    continue;
                }
            };

            out.push_str(&self.resolve(&name, stack)?);
        }

        Ok(out)
    }

    fn resolve(&self, name: &str, stack: &mut Vec<String>) -> Result<String, PropertyError> {
        if stack.iter().any(|seen| seen == name) {
            return Err(PropertyError::Recursive(name.to_owned()));
        }

        match self.properties.get(name) {
            None => Err(PropertyError::Undefined(name.to_owned())),
            Some(Value::String(text)) => {
                stack.push(name.to_owned());
                let expanded = self.expand_inner(text, stack);
                stack.pop();
                expanded
            }
            Some(other) => Ok(other.to_string()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────

    /// Checks the project for problems that would make a build meaningless.
    ///
    /// Returns one human-readable message per problem; an empty list means
    /// the project is valid. String properties are checked for references
    /// to undefined properties and for recursion; malformed `${...}` text is
    /// left for the code that expands it.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if self.name.trim().is_empty() {
            messages.push("project name is not set".to_owned());
        }
        if self.version.trim().is_empty() {
            messages.push("project version is not set".to_owned());
        }

        for task in &self.default_tasks {
            if !is_valid_name(task) {
                messages.push(format!("default task '{task}' is not a valid task name"));
            }
        }

        for (name, value) in &self.properties {
            let Value::String(text) = value else {
                continue;
            };
            match self.expand(text) {
                Ok(_) | Err(PropertyError::InvalidPlaceholder(_)) => {}
                Err(PropertyError::Undefined(missing)) => messages.push(format!(
                    "property '{name}' references undefined property '{missing}'"
                )),
                Err(err) => messages.push(format!("property '{name}': {err}")),
            }
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn project() -> Project {
        Project::new("/work/app")
    }

    #[test]
    fn name_defaults_to_directory() {
        let project = project();
        assert_eq!(project.name, "app");
        assert_eq!(project.version, DEFAULT_VERSION);
    }

    #[test]
    fn property_accessors() {
        let mut project = project();
        assert!(!project.has_property("verbose"));
        assert_eq!(project.get_property_or("verbose", false), json!(false));

        assert!(project.set_property("verbose", true).is_none());
        assert_eq!(project.get_property("verbose"), Some(&json!(true)));

        assert!(!project.set_property_if_unset("verbose", false));
        assert!(project.set_property_if_unset("jobs", 4));
        assert_eq!(project.get_property("verbose"), Some(&json!(true)));
        assert_eq!(project.get_property("jobs"), Some(&json!(4)));
    }

    #[test]
    fn expands_both_reference_forms() {
        let mut project = project();
        project.set_property("a", "x");
        project.set_property("n", 3);

        assert_eq!(project.expand("$a-${a}y-$n").unwrap(), "x-xy-3");
        assert_eq!(project.expand("cost: $$5").unwrap(), "cost: $5");
        assert_eq!(project.expand("plain").unwrap(), "plain");
    }

    #[test]
    fn expansion_errors() {
        let mut project = project();
        assert_eq!(
            project.expand("$missing"),
            Err(PropertyError::Undefined("missing".to_owned()))
        );
        assert_eq!(project.expand("${open"), Err(PropertyError::InvalidPlaceholder(0)));
        assert_eq!(project.expand("${1x}"), Err(PropertyError::InvalidPlaceholder(0)));

        project.set_property("loop_a", "$loop_b");
        project.set_property("loop_b", "$loop_a");
        assert!(matches!(
            project.expand("$loop_a"),
            Err(PropertyError::Recursive(_))
        ));
    }

    #[test]
    fn expand_path_joins_onto_basedir() {
        let mut project = project();
        project.set_property("dir_target", "target");

        let path = project.expand_path(&["$dir_target", "reports"]).unwrap();
        assert_eq!(path, PathBuf::from("/work/app/target/reports"));
    }

    #[test]
    fn validate_reports_problems() {
        let mut project = project();
        assert!(project.validate().is_empty());

        project.name.clear();
        project.default_tasks.push("not valid".to_owned());
        project.set_property("dir_logs", "$dir_target/logs");

        let messages = project.validate();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("name"));
        assert!(messages[1].contains("not valid"));
        assert!(messages[2].contains("dir_target"));
    }

    #[test]
    fn stray_dollar_signs_are_literal() {
        let project = project();
        assert_eq!(project.expand("a $").unwrap(), "a $");
        assert_eq!(project.expand("^test_.*$").unwrap(), "^test_.*$");
        assert_eq!(project.expand("costs $5 or $-").unwrap(), "costs $5 or $-");
    }

    #[test]
    fn validate_ignores_literal_text() {
        let mut project = project();
        project.set_property("pattern", "^test_.*$");
        project.set_property("template", "${unterminated");
        assert!(project.validate().is_empty());

        project.set_property("loop_a", "$loop_a");
        let messages = project.validate();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("loop_a"));
    }
}
