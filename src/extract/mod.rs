//! Reconstructs class records from the flat token sequence of a course page.
//!
//! The page exposes no structure beyond token order. Records are found by the
//! [`locator`], enriched by the activity, schedule and location extractors, and filtered
//! by the [`Deduplicator`]. Nothing here fails on malformed input: unresolved fields stay
//! empty and location gaps are reported as warnings.

pub mod activity;
pub mod dedup;
pub mod locator;
pub mod location;
pub mod patterns;
pub mod schedule;
pub mod warnings;

#[cfg(test)]
pub(crate) mod test_support;

pub use dedup::Deduplicator;
pub use locator::{locate, Candidate};
pub use warnings::WarningCollector;

use crate::config::ExtractionConfig;
use crate::model::{ClassRecord, LocationWarning};
use crate::{log_debug, log_trace};

/// Visible text of one course page, in document order.
#[derive(Debug, Clone, Default)]
pub struct CoursePage {
    pub course_code: String,
    pub course_name: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PageExtraction {
    pub records: Vec<ClassRecord>,
    pub warnings: Vec<LocationWarning>,
    pub candidates: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extracts one page on its own, with a fresh duplicate set.
    pub fn extract_page(&self, page: &CoursePage) -> PageExtraction {
        self.extract_page_with(page, &mut Deduplicator::new())
    }

    /// Extracts one page, sharing `dedup` with the rest of the scrape pass.
    pub fn extract_page_with(&self, page: &CoursePage, dedup: &mut Deduplicator) -> PageExtraction {
        let tokens = &page.tokens;
        let candidates = locate(tokens, &self.config);
        let mut warnings = WarningCollector::new();
        let mut extraction = PageExtraction {
            candidates: candidates.len(),
            ..PageExtraction::default()
        };

        for candidate in &candidates {
            let activity =
                activity::extract_activity(tokens, candidate.term_index, self.config.activity_radius);

            if candidate.enrolment.capacity == 0 {
                log_trace!(
                    "[extract] {} class {} at {} has no capacity, skipping",
                    page.course_code,
                    candidate.class_id,
                    candidate.start_index
                );
                extraction.rejected += 1;
                continue;
            }

            if !dedup.accept(candidate.class_id, candidate.term, activity) {
                extraction.duplicates += 1;
                continue;
            }

            let schedule = schedule::extract_schedule(tokens, candidate.start_index, &self.config);
            let location =
                location::resolve_location(tokens, candidate, &self.config, &mut warnings);

            extraction.records.push(ClassRecord {
                course_code: page.course_code.clone(),
                course_name: page.course_name.clone(),
                class_id: candidate.class_id,
                section: tokens
                    .get(candidate.start_index + 1)
                    .cloned()
                    .unwrap_or_default(),
                term: candidate.term,
                activity,
                status: candidate.status,
                enrolment: candidate.enrolment,
                schedule,
                location,
            });
        }

        extraction.warnings = warnings.into_vec();

        log_debug!(
            "[extract] {}: {} candidates, {} records, {} rejected, {} duplicates, {} warnings",
            page.course_code,
            extraction.candidates,
            extraction.records.len(),
            extraction.rejected,
            extraction.duplicates,
            extraction.warnings.len()
        );

        extraction
    }
}
