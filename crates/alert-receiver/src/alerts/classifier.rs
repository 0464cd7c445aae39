//! Rule-based alert classification.
//!
//! Alert names are free text chosen by whoever wrote the monitoring rule, so
//! classification is deliberately loose: a rule matches when any of its
//! patterns appears anywhere in the lower-cased name. Rules are evaluated in
//! order and the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handling category for an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Repeated authentication failures
    FailedLogins,
    /// Intrusion detection / banned IPs
    Intrusion,
    /// Elevated HTTP error rates
    HttpErrors,
    /// CPU or load pressure
    SystemIssues,
    /// No rule matched
    #[serde(rename = "none")]
    Unclassified,
}

impl Category {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailedLogins => "failed_logins",
            Self::Intrusion => "intrusion",
            Self::HttpErrors => "http_errors",
            Self::SystemIssues => "system_issues",
            Self::Unclassified => "none",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Category assigned on match
    pub category: Category,
    /// Substrings, any of which triggers the rule
    pub patterns: Vec<String>,
}

impl ClassificationRule {
    /// Create a rule from string patterns.
    #[must_use]
    pub fn new(category: Category, patterns: &[&str]) -> Self {
        Self {
            category,
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Whether this rule matches an already lower-cased name.
    fn matches(&self, lowered_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| lowered_name.contains(p.to_lowercase().as_str()))
    }
}

/// The built-in rule list.
#[must_use]
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(Category::FailedLogins, &["failed_logins"]),
        ClassificationRule::new(Category::Intrusion, &["intrusion", "banned"]),
        ClassificationRule::new(Category::HttpErrors, &["http", "error"]),
        ClassificationRule::new(Category::SystemIssues, &["cpu", "load"]),
    ]
}

/// Maps alert names to categories using an ordered rule list.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    /// Create a classifier. Rules are evaluated in the given order.
    #[must_use]
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify an alert name. Matching is case-insensitive.
    #[must_use]
    pub fn classify(&self, alert_name: &str) -> Category {
        let lowered = alert_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(Category::Unclassified, |rule| rule.category)
    }
}
