use crate::error::{ConfigError, Result};
use crate::model::Term;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Live,
    Fixtures,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Subject-area codes to process, e.g. `["COMP"]`. Empty means all.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Only keep classes offered in this term.
    #[serde(default)]
    pub term: Option<Term>,
    /// Persisted as `scrapedFor` on every document.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub test_run: bool,
    #[serde(default = "default_source")]
    pub source: SourceKind,
    #[serde(default = "default_fixture_dir")]
    pub fixture_dir: String,
    #[serde(default)]
    pub record_fixtures: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// Window sizes and offsets used by the extractors.
///
/// These were tuned against one rendering of the timetable pages; treat them as
/// knobs to re-validate against saved fixture pages when the site layout changes.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_min_class_id")]
    pub min_class_id: u32,
    /// The locator stops this many tokens before the end of the page.
    #[serde(default = "default_min_window")]
    pub min_window: usize,
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    #[serde(default = "default_status_max_offset")]
    pub status_max_offset: usize,
    #[serde(default = "default_enrolment_max_offset")]
    pub enrolment_max_offset: usize,
    #[serde(default = "default_term_max_offset")]
    pub term_max_offset: usize,
    #[serde(default = "default_activity_radius")]
    pub activity_radius: usize,
    #[serde(default = "default_schedule_before")]
    pub schedule_before: usize,
    #[serde(default = "default_schedule_after")]
    pub schedule_after: usize,
    #[serde(default = "default_condensed_window")]
    pub condensed_window: usize,
    #[serde(default = "default_expanded_table_offset")]
    pub expanded_table_offset: usize,
    #[serde(default = "default_expanded_lookahead")]
    pub expanded_lookahead: usize,
    #[serde(default = "default_expanded_tail_guard")]
    pub expanded_tail_guard: usize,
    #[serde(default = "default_broad_before")]
    pub broad_before: usize,
    #[serde(default = "default_broad_after")]
    pub broad_after: usize,
    #[serde(default = "default_known_buildings")]
    pub known_buildings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_sink_directory")]
    pub directory: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_subject_index_path")]
    pub subject_index_path: String,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub sink: SinkConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            filename: default_log_filename(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            term: None,
            tag: None,
            test_run: false,
            source: default_source(),
            fixture_dir: default_fixture_dir(),
            record_fixtures: false,
            dry_run: false,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_class_id: default_min_class_id(),
            min_window: default_min_window(),
            lookahead: default_lookahead(),
            status_max_offset: default_status_max_offset(),
            enrolment_max_offset: default_enrolment_max_offset(),
            term_max_offset: default_term_max_offset(),
            activity_radius: default_activity_radius(),
            schedule_before: default_schedule_before(),
            schedule_after: default_schedule_after(),
            condensed_window: default_condensed_window(),
            expanded_table_offset: default_expanded_table_offset(),
            expanded_lookahead: default_expanded_lookahead(),
            expanded_tail_guard: default_expanded_tail_guard(),
            broad_before: default_broad_before(),
            broad_after: default_broad_after(),
            known_buildings: default_known_buildings(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            directory: default_sink_directory(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            subject_index_path: default_subject_index_path(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            request_delay_ms: default_request_delay_ms(),
            scrape: ScrapeConfig::default(),
            extraction: ExtractionConfig::default(),
            sink: SinkConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::FileRead)?;
        let config = Self::from_toml(&content)?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingField("base_url".to_string()).into());
        }
        if !self.base_url.starts_with("http") {
            return Err(ConfigError::InvalidValue(format!(
                "base_url must start with http(s): {}",
                self.base_url
            ))
            .into());
        }

        if self.subject_index_path.is_empty() {
            return Err(ConfigError::MissingField("subject_index_path".to_string()).into());
        }

        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue(
                "max_retries must be greater than 0".to_string(),
            )
            .into());
        }

        if self.retry_delay == 0 {
            return Err(ConfigError::InvalidValue(
                "retry_delay must be greater than 0".to_string(),
            )
            .into());
        }

        if self.scrape.source == SourceKind::Fixtures && self.scrape.fixture_dir.is_empty() {
            return Err(ConfigError::MissingField("scrape.fixture_dir".to_string()).into());
        }

        if self.sink.batch_size == 0 || self.sink.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue(format!(
                "sink.batch_size must be between 1 and {}",
                MAX_BATCH_SIZE
            ))
            .into());
        }

        if !self.scrape.dry_run && self.sink.directory.is_empty() {
            return Err(ConfigError::MissingField("sink.directory".to_string()).into());
        }

        self.extraction.validate()
    }
}

impl ExtractionConfig {
    fn validate(&self) -> Result<()> {
        let windows = [
            ("lookahead", self.lookahead),
            ("status_max_offset", self.status_max_offset),
            ("enrolment_max_offset", self.enrolment_max_offset),
            ("term_max_offset", self.term_max_offset),
            ("condensed_window", self.condensed_window),
            ("expanded_lookahead", self.expanded_lookahead),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "extraction.{} must be greater than 0",
                    name
                ))
                .into());
            }
        }

        let offsets = [
            ("status_max_offset", self.status_max_offset),
            ("enrolment_max_offset", self.enrolment_max_offset),
            ("term_max_offset", self.term_max_offset),
        ];
        for (name, value) in offsets {
            if value > self.lookahead {
                return Err(ConfigError::InvalidValue(format!(
                    "extraction.{} ({}) cannot exceed lookahead ({})",
                    name, value, self.lookahead
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// Largest number of writes the document store accepts in one batch.
pub const MAX_BATCH_SIZE: usize = 500;

fn default_base_url() -> String {
    "https://timetable.unsw.edu.au".to_string()
}

fn default_subject_index_path() -> String {
    "/2025/subjectSearch.html".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_source() -> SourceKind {
    SourceKind::Live
}

fn default_fixture_dir() -> String {
    "local_html".to_string()
}

fn default_min_class_id() -> u32 {
    1000
}

fn default_min_window() -> usize {
    12
}

fn default_lookahead() -> usize {
    15
}

fn default_status_max_offset() -> usize {
    7
}

fn default_enrolment_max_offset() -> usize {
    7
}

fn default_term_max_offset() -> usize {
    10
}

fn default_activity_radius() -> usize {
    3
}

fn default_schedule_before() -> usize {
    5
}

fn default_schedule_after() -> usize {
    25
}

fn default_condensed_window() -> usize {
    150
}

fn default_expanded_table_offset() -> usize {
    700
}

fn default_expanded_lookahead() -> usize {
    20
}

fn default_expanded_tail_guard() -> usize {
    10
}

fn default_broad_before() -> usize {
    50
}

fn default_broad_after() -> usize {
    300
}

fn default_known_buildings() -> Vec<String> {
    ["Quadrangle", "Matthews", "Goldstein", "Webster", "Science Theatre"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sink_directory() -> String {
    "json_data/classes".to_string()
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_filename() -> String {
    "timetable-scraper.log".to_string()
}
