//! Request payload validation with itemized field issues.

use serde::Serialize;
use std::fmt;

/// One failed check, addressed by its path inside the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub code: &'static str,
    pub path: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(code: &'static str, path: &[&str], message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(code, path, message);
        errors
    }

    pub fn push(&mut self, code: &'static str, path: &[&str], message: impl Into<String>) {
        self.0.push(FieldIssue {
            code,
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
        });
    }

    /// Appends `other`, prefixing each issue path with `prefix`.
    pub fn nest(&mut self, prefix: &[&str], other: ValidationErrors) {
        for mut issue in other.0 {
            let mut path: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
            path.append(&mut issue.path);
            issue.path = path;
            self.0.push(issue);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    /// `[a-z0-9_-]`, 1 to 64 characters.
    pub fn check_slug(&mut self, path: &[&str], value: &str) {
        if value.is_empty() {
            self.push("too_small", path, "must not be empty");
        } else if value.len() > 64 {
            self.push("too_big", path, "must be at most 64 characters");
        } else if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            self.push(
                "invalid_string",
                path,
                "may only contain lowercase letters, digits, '_' and '-'",
            );
        }
    }

    pub fn check_text(&mut self, path: &[&str], value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push("too_small", path, "must not be empty");
        } else if value.chars().count() > max {
            self.push("too_big", path, format!("must be at most {max} characters"));
        }
    }

    /// Absolute `http`/`https` URL.
    pub fn check_url(&mut self, path: &[&str], value: &str) {
        match url::Url::parse(value) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(_) => self.push("invalid_string", path, "must be an http or https URL"),
            Err(e) => self.push("invalid_string", path, format!("invalid URL: {e}")),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|i| format!("{}: {}", i.path.join("."), i.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Payloads that check themselves before touching the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_itemized_issues() {
        let mut errors = ValidationErrors::new();
        errors.check_slug(&["id"], "Bad Id");
        errors.check_text(&["name"], "   ", 128);
        errors.check_url(&["url"], "ftp://example.com");
        errors.check_url(&["url"], "https://example.com/mod");

        let codes: Vec<_> = errors.issues().iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["invalid_string", "too_small", "invalid_string"]);
        assert_eq!(errors.issues()[0].path, vec!["id".to_string()]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn nest_prefixes_paths() {
        let mut outer = ValidationErrors::new();
        outer.nest(
            &["dependencies", "0"],
            ValidationErrors::single("too_small", &["id"], "must not be empty"),
        );
        assert_eq!(
            outer.issues()[0].path,
            vec!["dependencies".to_string(), "0".to_string(), "id".to_string()]
        );
    }
}
