use super::locator::Candidate;
use super::patterns::{ENROLMENT, LOOSE_VENUE, NON_LOCATION_LABEL, ONLINE, SECTION_CODE, VENUE};
use super::warnings::WarningCollector;
use crate::config::ExtractionConfig;
use crate::model::{Location, WarningIssue};
use crate::log_trace;

/// One self-contained way of finding a record's location. Returns raw, un-normalized text.
type Strategy = fn(&[String], &Candidate, &ExtractionConfig) -> Option<Location>;

/// Tried in order; the first hit wins.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("condensed", condensed_window),
    ("expanded-table", expanded_table),
    ("broad", broad_proximity),
];

/// Resolves the location for a located record.
///
/// Location cells sit far from the record start (often 100+ tokens), so no single window
/// is reliable. Unresolved or malformed locations come back empty and leave a warning.
pub fn resolve_location(
    tokens: &[String],
    candidate: &Candidate,
    config: &ExtractionConfig,
    warnings: &mut WarningCollector,
) -> Location {
    let found = STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(tokens, candidate, config).map(|location| (*name, location))
    });

    let Some((strategy, raw)) = found else {
        warnings.record(
            candidate.class_id,
            candidate.term,
            WarningIssue::NoLocationData,
            "",
        );
        return Location::default();
    };

    let full_text = match normalize_location_text(&raw.full_text) {
        Ok(text) => text,
        Err(bogus) => {
            warnings.record(
                candidate.class_id,
                candidate.term,
                WarningIssue::InvalidLocationFormat,
                &bogus,
            );
            return Location::default();
        }
    };

    log_trace!(
        "[location] class {} resolved by {} strategy: {}",
        candidate.class_id,
        strategy,
        full_text
    );

    Location {
        full_text,
        building: clean_entities(&raw.building),
        room: raw.room.trim().to_string(),
    }
}

/// Cleaned location text, or the cleaned value back as the error when it has no letters
/// or is shorter than two characters.
fn normalize_location_text(raw: &str) -> Result<String, String> {
    let text = clean_entities(raw);
    if !text.chars().any(|c| c.is_ascii_alphabetic()) || text.chars().count() < 2 {
        return Err(text);
    }
    Ok(text)
}

/// Decodes the handful of entities that leak into rendered cells.
pub fn clean_entities(text: &str) -> String {
    text.replace("&amp;", "and")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Strategy A: the first venue-like cell in the tokens following the start.
fn condensed_window(
    tokens: &[String],
    candidate: &Candidate,
    config: &ExtractionConfig,
) -> Option<Location> {
    let start = candidate.start_index;
    let end = tokens.len().min(start.saturating_add(config.condensed_window));

    tokens
        .get(start..end)?
        .iter()
        .find_map(|text| match_venue(text).or_else(|| match_loose_venue(text)))
}

/// Strategy B: the detail table rendered further down the page repeats the class id
/// in its own cell, followed shortly by the venue.
fn expanded_table(
    tokens: &[String],
    candidate: &Candidate,
    config: &ExtractionConfig,
) -> Option<Location> {
    let class_id = candidate.class_id.to_string();
    let end = tokens.len().saturating_sub(config.expanded_tail_guard);

    (config.expanded_table_offset..end)
        .filter(|&i| tokens[i] == class_id)
        .find_map(|i| {
            let to = tokens.len().min(i.saturating_add(config.expanded_lookahead));
            tokens.get(i + 1..to)?.iter().find_map(|text| match_venue(text))
        })
}

/// Strategy C: the cell closest to the start, either side, that looks like a venue or
/// names a known building. It is only accepted when it parses as a venue.
fn broad_proximity(
    tokens: &[String],
    candidate: &Candidate,
    config: &ExtractionConfig,
) -> Option<Location> {
    let start = candidate.start_index;
    let from = start.saturating_sub(config.broad_before);
    let to = tokens.len().min(start.saturating_add(config.broad_after));

    let (_, text) = (from..to)
        .filter(|&i| {
            let text = tokens[i].as_str();
            config
                .known_buildings
                .iter()
                .any(|building| text.contains(building.as_str()))
                || VENUE.is_match(text)
                || ONLINE.is_match(text)
        })
        .map(|i| (i.abs_diff(start), &tokens[i]))
        .min_by_key(|(distance, _)| *distance)?;

    match_venue(text)
}

/// `Quadrangle G048 (K-E15-G048)` or `Online (ONLINE)`.
fn match_venue(text: &str) -> Option<Location> {
    if let Some(caps) = VENUE.captures(text) {
        return Some(Location {
            full_text: text.to_string(),
            building: caps[1].trim().to_string(),
            room: caps[2].trim().to_string(),
        });
    }

    if ONLINE.is_match(text) {
        return Some(Location {
            full_text: text.to_string(),
            building: "Online".to_string(),
            room: String::new(),
        });
    }

    None
}

/// `Matthews 311`, unless the cell is one of the labels that share the shape.
fn match_loose_venue(text: &str) -> Option<Location> {
    let caps = LOOSE_VENUE.captures(text)?;
    let length = text.chars().count();
    if NON_LOCATION_LABEL.is_match(text)
        || ENROLMENT.is_match(text)
        || SECTION_CODE.is_match(text)
        || !(4..20).contains(&length)
    {
        return None;
    }

    Some(Location {
        full_text: text.to_string(),
        building: caps[1].to_string(),
        room: caps[2].to_string(),
    })
}
