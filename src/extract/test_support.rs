//! Builders for synthetic token sequences.

use super::locator::Candidate;
use crate::model::{Enrolment, Status, Term};

pub fn tokens(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// Cells that match none of the record, schedule or location shapes.
pub fn filler(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("cell-{}", i)).collect()
}

/// A record laid out the way the compact timetable table renders it.
pub fn record(class_id: u32, section: &str, activity: &str, status: &str, enrolment: &str, term: &str) -> Vec<String> {
    tokens(&[&class_id.to_string(), section, activity, status, enrolment, term])
}

pub fn candidate_at(start_index: usize, class_id: u32) -> Candidate {
    Candidate {
        start_index,
        class_id,
        status_index: start_index + 3,
        status: Status::Open,
        enrolment_index: start_index + 4,
        enrolment: Enrolment {
            enrolled: 1,
            capacity: 10,
        },
        term_index: start_index + 5,
        term: Term::T3,
    }
}
