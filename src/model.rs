//! Structured class records recovered from timetable pages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    T1,
    T2,
    T3,
}

impl Term {
    pub const ALL: [Term; 3] = [Term::T1, Term::T2, Term::T3];

    /// Exact match against a term label such as `"T3"`.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|term| term.as_str() == text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Term::T1 => "T1",
            Term::T2 => "T2",
            Term::T3 => "T3",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Open,
    Full,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Open, Status::Full, Status::OnHold];

    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Full => "Full",
            Status::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Lecture,
    Tutorial,
    Laboratory,
    Seminar,
    Workshop,
    #[serde(rename = "Course Enrolment")]
    CourseEnrolment,
    Unknown,
}

impl Activity {
    /// Labels searched for inside activity cells, in priority order.
    pub const KEYWORDS: [(&'static str, Activity); 6] = [
        ("Lecture", Activity::Lecture),
        ("Tutorial", Activity::Tutorial),
        ("Laboratory", Activity::Laboratory),
        ("Seminar", Activity::Seminar),
        ("Workshop", Activity::Workshop),
        ("Course Enrolment", Activity::CourseEnrolment),
    ];

    /// Normalizes a cell such as `"Tutorial-Laboratory"` by substring containment.
    pub fn from_label(text: &str) -> Option<Self> {
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, activity)| *activity)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Lecture => "Lecture",
            Activity::Tutorial => "Tutorial",
            Activity::Laboratory => "Laboratory",
            Activity::Seminar => "Seminar",
            Activity::Workshop => "Workshop",
            Activity::CourseEnrolment => "Course Enrolment",
            Activity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrolment {
    pub enrolled: u32,
    pub capacity: u32,
}

impl Enrolment {
    pub fn has_vacancy(&self) -> bool {
        self.enrolled < self.capacity
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub full_schedule_text: String,
}

impl Schedule {
    /// `"Wed 11:00 - 13:00"`, or empty while any part is unresolved.
    pub fn display_string(&self) -> String {
        if self.day_of_week.is_empty() || self.start_time.is_empty() || self.end_time.is_empty()
        {
            return String::new();
        }
        format!("{} {} - {}", self.day_of_week, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub full_text: String,
    pub building: String,
    pub room: String,
}

impl Location {
    pub fn is_resolved(&self) -> bool {
        !self.full_text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Online,
    #[serde(rename = "In Person")]
    InPerson,
    Unknown,
}

impl Mode {
    pub fn for_location(location: &Location) -> Self {
        if !location.is_resolved() {
            Mode::Unknown
        } else if location.full_text.to_lowercase().contains("online") {
            Mode::Online
        } else {
            Mode::InPerson
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Online => "Online",
            Mode::InPerson => "In Person",
            Mode::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub course_code: String,
    pub course_name: String,
    pub class_id: u32,
    pub section: String,
    pub term: Term,
    pub activity: Activity,
    pub status: Status,
    pub enrolment: Enrolment,
    pub schedule: Schedule,
    pub location: Location,
}

impl ClassRecord {
    pub fn mode(&self) -> Mode {
        Mode::for_location(&self.location)
    }

    /// Key used by the document store.
    pub fn document_key(&self) -> String {
        self.class_id.to_string()
    }

    /// Flat key-value document handed to the persistence sink.
    pub fn to_document(&self, written_at: DateTime<Utc>, tag: Option<&str>) -> Map<String, Value> {
        let value = json!({
            "courseCode": self.course_code,
            "courseName": self.course_name,
            "classId": self.class_id,
            "section": self.section,
            "term": self.term,
            "activity": self.activity,
            "status": self.status,
            "courseEnrolment": {
                "enrolments": self.enrolment.enrolled,
                "capacity": self.enrolment.capacity,
            },
            "schedule": {
                "dayOfWeek": self.schedule.day_of_week,
                "startTime": self.schedule.start_time,
                "endTime": self.schedule.end_time,
                "displayString": self.schedule.display_string(),
                "fullScheduleText": self.schedule.full_schedule_text,
            },
            "location": {
                "fullText": self.location.full_text,
                "building": self.location.building,
                "room": self.location.room,
            },
            "mode": self.mode(),
            "lastUpdated": written_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        let mut document = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(tag) = tag {
            document.insert("scrapedFor".to_string(), Value::String(tag.to_string()));
        }
        document
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningIssue {
    InvalidLocationFormat,
    NoLocationData,
}

impl fmt::Display for WarningIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningIssue::InvalidLocationFormat => f.write_str("Invalid location format"),
            WarningIssue::NoLocationData => f.write_str("No location data found"),
        }
    }
}

/// Operator-facing note about a location that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationWarning {
    pub class_id: u32,
    pub term: Term,
    pub issue: WarningIssue,
    pub raw_value: String,
}

impl fmt::Display for LocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {} ({}): {}", self.class_id, self.term, self.issue)?;
        if !self.raw_value.is_empty() {
            write!(f, " [{:?}]", self.raw_value)?;
        }
        Ok(())
    }
}
