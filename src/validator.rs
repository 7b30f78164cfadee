//! Problems found while checking an endpoint definition file.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Where the problem is, e.g. `endpoints[2].path`
    pub location: String,
    /// Short machine-friendly category, e.g. `duplicate_name`
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!(
        "\n❌ Endpoint definition check failed. {} issue(s) found:\n",
        issues.len()
    );
    for issue in issues {
        eprintln!("{issue}");
    }
    eprintln!("\nPlease fix the issues in your endpoint file before serving it.\n");
}

/// Turn a non-empty issue list into one error listing every issue.
pub fn fail_if_issues(issues: &[ValidationIssue]) -> anyhow::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
    anyhow::bail!(
        "{} issue(s) in endpoint definitions:\n{}",
        issues.len(),
        lines.join("\n")
    )
}
