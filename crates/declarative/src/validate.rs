//! Value constraint helpers
//!
//! Adapters collect findings into a [`Diagnostics`] and hand the list back
//! to the host; nothing here talks to the remote side.

use crate::error::{Diagnostic, Error, Result};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// Accumulator for validation findings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arbitrary finding.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.items.push(Diagnostic::new(path, message));
        self
    }

    /// Record a finding when `condition` is false.
    pub fn ensure(&mut self, condition: bool, path: &str, message: &str) -> &mut Self {
        if !condition {
            self.push(path, message);
        }
        self
    }

    /// Inclusive integer range check; unset values pass.
    pub fn int_between(&mut self, path: &str, value: Option<i64>, min: i64, max: i64) -> &mut Self {
        if let Some(v) = value
            && !(min..=max).contains(&v)
        {
            self.push(path, format!("must be between {min} and {max}, got {v}"));
        }
        self
    }

    /// Lower bound check; unset values pass.
    pub fn int_at_least(&mut self, path: &str, value: Option<i64>, min: i64) -> &mut Self {
        if let Some(v) = value
            && v < min
        {
            self.push(path, format!("must be at least {min}, got {v}"));
        }
        self
    }

    /// Enumerated integer check; unset values pass.
    pub fn int_one_of(&mut self, path: &str, value: Option<i64>, allowed: &[i64]) -> &mut Self {
        if let Some(v) = value
            && !allowed.contains(&v)
        {
            self.push(path, format!("must be one of {}, got {v}", list(allowed)));
        }
        self
    }

    /// Enumerated string check; unset values pass.
    pub fn str_one_of(&mut self, path: &str, value: Option<&str>, allowed: &[&str]) -> &mut Self {
        if let Some(v) = value
            && !allowed.contains(&v)
        {
            self.push(path, format!("must be one of {}, got {v:?}", list(allowed)));
        }
        self
    }

    /// Every element of the list must be one of `allowed`.
    pub fn each_one_of<S: AsRef<str>>(
        &mut self,
        path: &str,
        values: &[S],
        allowed: &[&str],
    ) -> &mut Self {
        for (i, v) in values.iter().enumerate() {
            self.str_one_of(&format!("{path}/{i}"), Some(v.as_ref()), allowed);
        }
        self
    }

    /// Non-empty string check; unset values pass.
    pub fn not_empty(&mut self, path: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value
            && v.trim().is_empty()
        {
            self.push(path, "must not be empty");
        }
        self
    }

    /// List elements must be pairwise distinct.
    pub fn unique<T: Eq + Hash + Display>(&mut self, path: &str, values: &[T]) -> &mut Self {
        let mut seen = HashSet::new();
        for v in values {
            if !seen.insert(v) {
                self.push(path, format!("duplicate value {v}"));
            }
        }
        self
    }

    /// Merge findings from a nested validation.
    pub fn extend(&mut self, other: Vec<Diagnostic>) -> &mut Self {
        self.items.extend(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    /// Turn the findings into a `Result`.
    pub fn into_result(self) -> Result<()> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.items))
        }
    }
}

fn list<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_between() {
        let mut d = Diagnostics::new();
        d.int_between("/type", Some(0), 1, 15)
            .int_between("/type", Some(15), 1, 15)
            .int_between("/type", None, 1, 15);
        let items = d.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "must be between 1 and 15, got 0");
    }

    #[test]
    fn test_one_of() {
        let mut d = Diagnostics::new();
        d.str_one_of("/method", Some("TRACE"), &["GET", "POST"])
            .int_one_of("/mode", Some(2), &[1, 2]);
        let items = d.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "must be one of GET, POST, got \"TRACE\"");
    }

    #[test]
    fn test_unique() {
        let mut d = Diagnostics::new();
        d.unique("/permissions", &["*", "list", "*"]);
        assert_eq!(d.into_vec()[0].message, "duplicate value *");
    }

    #[test]
    fn test_each_one_of_paths() {
        let mut d = Diagnostics::new();
        d.each_one_of("/protocols", &["SSH", "GOPHER"], &["SSH", "FTP"]);
        assert_eq!(d.into_vec()[0].path, "/protocols/1");
    }

    #[test]
    fn test_into_result() {
        assert!(Diagnostics::new().into_result().is_ok());
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some("  "));
        assert!(matches!(d.into_result(), Err(Error::Validation(v)) if v.len() == 1));
    }
}
