//! Barcode format checks

use crate::models::Rule;
use crate::{Error, Result};
use regex::Regex;

/// Compiled code pattern
#[derive(Debug, Clone)]
pub struct CodeRule {
    name: String,
    regex: Regex,
}

impl CodeRule {
    pub fn compile(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| {
            Error::InvalidInput(format!("rule '{}' has an invalid pattern: {}", name, e))
        })?;
        Ok(Self { name, regex })
    }

    pub fn from_rule(rule: &Rule) -> Result<Self> {
        Self::compile(rule.rule_name.clone(), &rule.rule_value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, code: &str) -> bool {
        self.regex.is_match(code)
    }

    /// Fails with [`Error::InvalidFormat`] when the code does not match
    pub fn check(&self, code: &str) -> Result<()> {
        if self.matches(code) {
            Ok(())
        } else {
            Err(Error::InvalidFormat {
                code: code.to_string(),
                rule: self.pattern().to_string(),
            })
        }
    }
}
