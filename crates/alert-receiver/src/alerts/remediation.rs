//! Remediation playbooks emitted to the operator log.
//!
//! Each category has a fixed, ordered list of steps. The text is read by
//! people tailing the log, so it is kept exactly as operators know it.

use tracing::{error, warn};

use super::classifier::Category;

/// Log level a playbook is emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybookLevel {
    /// Security-relevant, needs immediate attention
    Critical,
    /// Degradation, needs attention soon
    Warning,
}

impl PlaybookLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
        }
    }
}

/// Remediation guidance for one alert category.
#[derive(Debug, Clone, Copy)]
pub struct RemediationPlaybook {
    pub category: Category,
    pub level: PlaybookLevel,
    pub header: &'static str,
    pub steps: &'static [&'static str],
}

const FAILED_LOGINS: RemediationPlaybook = RemediationPlaybook {
    category: Category::FailedLogins,
    level: PlaybookLevel::Critical,
    header: "🚨 FAILED LOGIN ALERT DETECTED",
    steps: &[
        "1. Review /var/log/auth.log on target system",
        "2. Check source IPs of failed attempts",
        "3. Consider blocking IPs via fail2ban",
        "4. Review user account access controls",
        "5. Consider enabling MFA",
    ],
};

const INTRUSION: RemediationPlaybook = RemediationPlaybook {
    category: Category::Intrusion,
    level: PlaybookLevel::Critical,
    header: "🚨 INTRUSION DETECTED - IP BANNED",
    steps: &[
        "1. IMMEDIATE: Verify the banned IP is malicious",
        "2. Check detailed fail2ban logs: /var/log/fail2ban.log",
        "3. Investigate attack patterns",
        "4. Review affected services (SSH, HTTP, etc.)",
        "5. Consider notification to upstream providers",
        "6. Add IP to permanent blocklist if pattern confirmed",
    ],
};

const HTTP_ERRORS: RemediationPlaybook = RemediationPlaybook {
    category: Category::HttpErrors,
    level: PlaybookLevel::Warning,
    header: "⚠️ HIGH HTTP ERROR RATE DETECTED",
    steps: &[
        "1. Check web server error logs (nginx/apache)",
        "2. Verify backend application status",
        "3. Check database connectivity",
        "4. Review resource utilization (disk, memory)",
        "5. Consider DDoS mitigation if sudden spike",
    ],
};

const SYSTEM_ISSUES: RemediationPlaybook = RemediationPlaybook {
    category: Category::SystemIssues,
    level: PlaybookLevel::Warning,
    header: "⚠️ SYSTEM RESOURCE ALERT",
    steps: &[
        "1. Identify top processes using resources: ps aux | sort -k3,3 -nr",
        "2. Check for memory leaks or zombie processes",
        "3. Review running services for unnecessary load",
        "4. Consider auto-scaling if in cloud environment",
        "5. Plan capacity upgrade if baseline trending high",
    ],
};

/// Look up the playbook for a category. `Unclassified` has none.
#[must_use]
pub fn playbook(category: Category) -> Option<&'static RemediationPlaybook> {
    match category {
        Category::FailedLogins => Some(&FAILED_LOGINS),
        Category::Intrusion => Some(&INTRUSION),
        Category::HttpErrors => Some(&HTTP_ERRORS),
        Category::SystemIssues => Some(&SYSTEM_ISSUES),
        Category::Unclassified => None,
    }
}

impl RemediationPlaybook {
    /// Lines emitted for an alert, in order: header, description, steps.
    #[must_use]
    pub fn render(&self, description: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.steps.len() + 2);
        lines.push(self.header.to_string());
        lines.push(format!("Description: {description}"));
        lines.extend(self.steps.iter().map(|s| (*s).to_string()));
        lines
    }

    /// Write the playbook to the operator log at its level.
    pub fn emit(&self, alert_name: &str, description: &str) {
        for line in self.render(description) {
            match self.level {
                PlaybookLevel::Critical => error!(
                    urgency = self.level.as_str(),
                    category = %self.category,
                    alert_name = %alert_name,
                    "{line}"
                ),
                PlaybookLevel::Warning => warn!(
                    urgency = self.level.as_str(),
                    category = %self.category,
                    alert_name = %alert_name,
                    "{line}"
                ),
            }
        }
    }
}
