use crate::model::{Activity, Term};
use std::collections::HashSet;

/// Remembers which `(class id, term, activity)` records a scrape pass has kept.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time a key is offered; later offers are rejected whatever their fields.
    pub fn accept(&mut self, class_id: u32, term: Term, activity: Activity) -> bool {
        self.seen.insert(format!("{}-{}-{}", class_id, term, activity))
    }
}
