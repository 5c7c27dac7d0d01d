use super::patterns::parse_enrolment;
use crate::config::ExtractionConfig;
use crate::model::{Enrolment, Status, Term};

/// A token position that starts a class record, with the markers that corroborated it.
/// All indices are absolute offsets into the page's token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub start_index: usize,
    pub class_id: u32,
    pub status_index: usize,
    pub status: Status,
    pub enrolment_index: usize,
    pub enrolment: Enrolment,
    pub term_index: usize,
    pub term: Term,
}

/// Scans the token sequence for record starts.
///
/// A start is a numeric token of at least `min_class_id` followed, within the lookahead
/// window, by a status, an `enrolled/capacity` ratio and a term label at their bounded
/// offsets. Every window position is tried independently, so overlapping candidates are
/// possible; the deduplicator collapses them later.
pub fn locate(tokens: &[String], config: &ExtractionConfig) -> Vec<Candidate> {
    let end = tokens.len().saturating_sub(config.min_window);
    (0..end)
        .filter_map(|start| candidate_at(tokens, start, config))
        .collect()
}

fn candidate_at(tokens: &[String], start: usize, config: &ExtractionConfig) -> Option<Candidate> {
    let class_id = tokens[start].parse::<u32>().ok()?;
    if class_id < config.min_class_id {
        return None;
    }

    let window = &tokens[start..tokens.len().min(start.saturating_add(config.lookahead))];

    let (status_offset, status) =
        find_marker(window, config.status_max_offset, |text| Status::parse(text))?;
    let (enrolment_offset, (enrolled, capacity)) =
        find_marker(window, config.enrolment_max_offset, parse_enrolment)?;
    let (term_offset, term) = find_marker(window, config.term_max_offset, |text| Term::parse(text))?;

    Some(Candidate {
        start_index: start,
        class_id,
        status_index: start + status_offset,
        status,
        enrolment_index: start + enrolment_offset,
        enrolment: Enrolment { enrolled, capacity },
        term_index: start + term_offset,
        term,
    })
}

/// First marker at an offset in `1..max_offset`; offset 0 is the identifier itself.
fn find_marker<T>(
    window: &[String],
    max_offset: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<(usize, T)> {
    window
        .iter()
        .enumerate()
        .take(max_offset)
        .skip(1)
        .find_map(|(offset, text)| parse(text.as_str()).map(|value| (offset, value)))
}
