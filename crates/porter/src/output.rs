//! Colored terminal output utilities.

use console::{Style, Term};
use porter_markup::{AttributeAudit, AuditDomain};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print a separator line.
    pub(crate) fn separator(&self) {
        let _ = self.term.write_line(&"=".repeat(70));
    }

    /// Print the unrecognized attribute counters.
    pub(crate) fn audit(&self, audit: &AttributeAudit) {
        if audit.is_empty() {
            self.info("No unrecognized attributes.");
            return;
        }
        self.separator();
        self.highlight("Unrecognized attributes");
        self.separator();
        for line in audit_lines(audit) {
            self.warning(&line);
        }
    }
}

fn audit_lines(audit: &AttributeAudit) -> Vec<String> {
    let mut lines = Vec::new();
    for (label, domain) in [("image", AuditDomain::Image), ("map", AuditDomain::Map)] {
        let counters = audit.counters(domain);
        if counters.is_empty() {
            continue;
        }
        lines.push(format!("{label}:"));
        lines.extend(
            counters
                .iter()
                .map(|(name, count)| format!("  {name}: {count}")),
        );
    }
    if audit.malformed() > 0 {
        lines.push(format!("malformed attribute text: {}", audit.malformed()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_audit_lines() {
        let mut audit = AttributeAudit::new();
        audit.record(AuditDomain::Image, ["width", "alt"]);
        audit.record(AuditDomain::Image, ["width"]);
        audit.record_malformed();

        assert_eq!(
            audit_lines(&audit),
            vec![
                "image:".to_owned(),
                "  alt: 1".to_owned(),
                "  width: 2".to_owned(),
                "malformed attribute text: 1".to_owned(),
            ]
        );
    }

    #[test]
    fn test_audit_lines_map_only() {
        let mut audit = AttributeAudit::new();
        audit.record(AuditDomain::Map, ["style"]);

        assert_eq!(
            audit_lines(&audit),
            vec!["map:".to_owned(), "  style: 1".to_owned()]
        );
    }
}
