use regex::Regex;
use std::sync::LazyLock;

/// `24/30`
pub static ENROLMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("invalid regex: enrolment"));

/// `Wed 11:00 - 13:00 (Weeks:1-5,7-10)`; only the prefix has to match.
pub static COMPOUND_SCHEDULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Mon|Tue|Wed|Thu|Fri|Sat|Sun)\s+(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})")
        .expect("invalid regex: compound schedule")
});

/// `11:00 - 13:00`
pub static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})$").expect("invalid regex: time range")
});

pub static DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Mon|Tue|Wed|Thu|Fri|Sat|Sun)$").expect("invalid regex: day")
});

/// `Quadrangle G048 (K-E15-G048)`
pub static VENUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z\s]+)\s+([A-Za-z0-9]+)\s*\(([^)]+)\)$").expect("invalid regex: venue")
});

/// `Online (ONLINE)`
pub static ONLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Online\s*\([^)]+\)$").expect("invalid regex: online"));

/// `CLB 7`, `Matthews 311`
pub static LOOSE_VENUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{2,})\s+([A-Za-z0-9]{1,4})$").expect("invalid regex: loose venue")
});

/// Labels that fit the loose venue shape but never name a room.
pub static NON_LOCATION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(Open|Full|On Hold|T1|T2|T3|Course Enrolment|Laboratory|Tutorial|Lecture|Seminar|Workshop|TERM|Teaching)$",
    )
    .expect("invalid regex: non-location label")
});

/// Section codes such as `H11A`.
pub static SECTION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\d{2,3}[A-Z]?$").expect("invalid regex: section code"));

pub fn parse_enrolment(text: &str) -> Option<(u32, u32)> {
    let caps = ENROLMENT.captures(text)?;
    let enrolled = caps[1].parse().ok()?;
    let capacity = caps[2].parse().ok()?;
    Some((enrolled, capacity))
}
