use crate::model::{LocationWarning, Term, WarningIssue};

/// Append-only list of unresolved extractions for one page.
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<LocationWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, class_id: u32, term: Term, issue: WarningIssue, raw_value: &str) {
        self.warnings.push(LocationWarning {
            class_id,
            term,
            issue,
            raw_value: raw_value.to_string(),
        });
    }

    pub fn into_vec(self) -> Vec<LocationWarning> {
        self.warnings
    }
}
