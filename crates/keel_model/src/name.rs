//! Identifier rule for task, action and initializer names.

use crate::error::BuildError;

/// Returns `true` if `name` is a letter or `_` followed by letters, digits or `_`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Validates `name`, returning it as an owned string.
///
/// # Errors
///
/// Returns [`BuildError::InvalidName`] if the identifier rule is not met.
pub fn validate_name(name: impl Into<String>) -> Result<String, BuildError> {
    let name = name.into();
    if is_valid_name(&name) {
        Ok(name)
    } else {
        Err(BuildError::InvalidName(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifiers() {
        for name in ["a", "_", "clean", "compile_sources", "run2", "_private", "Task"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_non_identifiers() {
        for name in ["", "1st", "with space", "dash-name", "dot.name", "ünïcode"] {
            assert!(!is_valid_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn validate_name_reports_offending_name() {
        let err = validate_name("not valid").unwrap_err();
        assert!(matches!(err, BuildError::InvalidName(ref name) if name == "not valid"));
    }
}
