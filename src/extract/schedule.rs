use super::patterns::{COMPOUND_SCHEDULE, DAY, TIME_RANGE};
use crate::config::ExtractionConfig;
use crate::model::Schedule;

/// Recovers day and time around a record start.
///
/// A compound `Wed 11:00 - 13:00` cell wins outright and ends the scan. Until one is
/// seen, a bare time range and a bare day cell fill their fields independently, first
/// occurrence each.
pub fn extract_schedule(tokens: &[String], start: usize, config: &ExtractionConfig) -> Schedule {
    let from = start.saturating_sub(config.schedule_before);
    let to = tokens.len().min(start.saturating_add(config.schedule_after));
    let window = tokens.get(from..to).unwrap_or_default();

    let mut schedule = Schedule::default();

    for text in window {
        if let Some(caps) = COMPOUND_SCHEDULE.captures(text) {
            return Schedule {
                day_of_week: caps[1].to_string(),
                start_time: caps[2].to_string(),
                end_time: caps[3].to_string(),
                full_schedule_text: text.clone(),
            };
        }

        if schedule.start_time.is_empty() {
            if let Some(caps) = TIME_RANGE.captures(text) {
                schedule.start_time = caps[1].to_string();
                schedule.end_time = caps[2].to_string();
            }
        }

        if schedule.day_of_week.is_empty() && DAY.is_match(text) {
            schedule.day_of_week = text.clone();
        }
    }

    schedule
}
