//! Plain-text rendering of alert statistics for the `stats` command.

use std::cmp::Ordering;

use super::store::AlertStatistics;
use super::types::severity_rank;

/// Order severities most urgent first; unranked severities sort last by name.
fn compare_severity(a: &str, b: &str) -> Ordering {
    match (severity_rank(a), severity_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Format statistics as a human-readable report.
#[must_use]
pub fn format_statistics_text(stats: &AlertStatistics) -> String {
    let mut lines = vec![
        "=== Alert Statistics ===".to_string(),
        format!("Total alerts: {}", stats.total),
        String::new(),
    ];

    lines.push("By severity:".to_string());
    if stats.by_severity.is_empty() {
        lines.push("  (none)".to_string());
    }
    let mut severities: Vec<_> = stats.by_severity.iter().collect();
    severities.sort_by(|(a, _), (b, _)| compare_severity(a, b));
    for (severity, count) in severities {
        lines.push(format!("  {severity:<10} {count}"));
    }
    lines.push(String::new());

    lines.push("By alert name:".to_string());
    if stats.by_name.is_empty() {
        lines.push("  (none)".to_string());
    }
    let mut names: Vec<_> = stats.by_name.iter().collect();
    names.sort_by(|(a, x), (b, y)| y.cmp(x).then_with(|| a.cmp(b)));
    for (name, count) in names {
        lines.push(format!("  {name:<30} {count}"));
    }
    lines.push(String::new());

    lines.push(format!("Recent alerts ({}):", stats.recent.len()));
    for record in &stats.recent {
        lines.push(format!(
            "  {} {} [{}] {}",
            record.timestamp_string(),
            record.name,
            record.severity,
            record.status
        ));
    }

    lines.join("\n")
}
