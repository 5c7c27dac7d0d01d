//! Drives one scrape pass: subjects, then courses, then extraction, then batched upserts.

use crate::config::{Config, ScrapeConfig};
use crate::error::Result;
use crate::extract::{Deduplicator, Extractor};
use crate::model::{ClassRecord, LocationWarning, Term};
use crate::sink::{BatchWriter, DocumentSink};
use crate::source::PageSource;
use crate::timetable::SubjectArea;
use crate::{log_error, log_info, log_warn};
use std::collections::BTreeMap;

/// Courses per subject processed in a test run.
const TEST_RUN_COURSES: usize = 5;

#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub subjects: usize,
    pub courses: usize,
    pub failed_subjects: Vec<String>,
    pub failed_courses: Vec<String>,
    pub records: Vec<ClassRecord>,
    pub warnings: Vec<LocationWarning>,
    pub written: usize,
}

impl ScrapeReport {
    pub fn classes_per_course(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.course_code.as_str()).or_default() += 1;
        }
        counts
    }

    pub fn classes_with_vacancy(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.enrolment.has_vacancy())
            .count()
    }

    pub fn classes_per_status(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status.as_str()).or_default() += 1;
        }
        counts
    }
}

pub struct Pipeline<'a> {
    source: &'a dyn PageSource,
    sink: &'a dyn DocumentSink,
    extractor: Extractor,
    scrape: ScrapeConfig,
    batch_size: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &Config, source: &'a dyn PageSource, sink: &'a dyn DocumentSink) -> Self {
        Self {
            source,
            sink,
            extractor: Extractor::new(config.extraction.clone()),
            scrape: config.scrape.clone(),
            batch_size: config.sink.batch_size,
        }
    }

    /// Scrapes every selected course, then persists whatever was recovered.
    ///
    /// Failing subjects and courses are logged and skipped. Only an unreachable subject
    /// index or a failed write aborts the run.
    pub async fn run(&self) -> Result<ScrapeReport> {
        let mut report = self.scrape().await?;
        log_summary(&report);

        if report.records.is_empty() {
            log_warn!("[pipeline] No classes to save");
            return Ok(report);
        }

        report.written = BatchWriter::new(self.sink, self.batch_size)
            .with_tag(self.scrape.tag.clone())
            .write_all(&report.records)
            .await?;

        log_info!("[pipeline] Saved {} classes", report.written);
        Ok(report)
    }

    /// Runs extraction over all selected pages without writing anything.
    pub async fn scrape(&self) -> Result<ScrapeReport> {
        let subjects = self.select_subjects(self.source.subject_areas().await?);
        let mut report = ScrapeReport {
            subjects: subjects.len(),
            ..ScrapeReport::default()
        };
        let mut dedup = Deduplicator::new();

        for subject in &subjects {
            log_info!("[pipeline] Processing subject {}", subject.code);
            if let Err(e) = self.scrape_subject(subject, &mut dedup, &mut report).await {
                log_error!(e => "[pipeline] Failed to process subject {}", subject.code);
                report.failed_subjects.push(subject.code.clone());
            }
        }

        Ok(report)
    }

    async fn scrape_subject(
        &self,
        subject: &SubjectArea,
        dedup: &mut Deduplicator,
        report: &mut ScrapeReport,
    ) -> Result<()> {
        let mut courses = self.source.course_links(subject).await?;
        if self.scrape.test_run {
            courses.truncate(TEST_RUN_COURSES);
        }

        for course in &courses {
            report.courses += 1;
            let page = match self.source.course_page(course).await {
                Ok(page) => page,
                Err(e) => {
                    log_error!(e => "[pipeline] Failed to scrape course {}", course.code);
                    report.failed_courses.push(course.code.clone());
                    continue;
                }
            };

            let extraction = self.extractor.extract_page_with(&page, dedup);
            let before = report.records.len();
            report.records.extend(
                extraction
                    .records
                    .into_iter()
                    .filter(|record| self.wants_term(record.term)),
            );
            report.warnings.extend(
                extraction
                    .warnings
                    .into_iter()
                    .filter(|warning| self.wants_term(warning.term)),
            );

            log_info!(
                "[pipeline] Found {} classes in {}",
                report.records.len() - before,
                course.code
            );
        }

        Ok(())
    }

    fn wants_term(&self, term: Term) -> bool {
        self.scrape.term.map_or(true, |wanted| wanted == term)
    }

    fn select_subjects(&self, subjects: Vec<SubjectArea>) -> Vec<SubjectArea> {
        let mut selected: Vec<SubjectArea> = subjects
            .into_iter()
            .filter(|subject| {
                self.scrape.subjects.is_empty() || self.scrape.subjects.contains(&subject.code)
            })
            .collect();

        if selected.is_empty() {
            log_warn!("[pipeline] No matching subject areas found");
        }
        if self.scrape.test_run {
            selected.truncate(1);
        }
        selected
    }
}

fn log_summary(report: &ScrapeReport) {
    log_info!(
        "[pipeline] Scraped {} classes from {} courses in {} subjects",
        report.records.len(),
        report.courses,
        report.subjects
    );

    let courses = report
        .classes_per_course()
        .iter()
        .map(|(course, count)| format!("{}: {}", course, count))
        .collect::<Vec<_>>()
        .join(", ");
    log_info!("[pipeline] Courses: {}", courses);

    let statuses = report
        .classes_per_status()
        .iter()
        .map(|(status, count)| format!("{}: {}", status, count))
        .collect::<Vec<_>>()
        .join(", ");
    log_info!(
        "[pipeline] Status: {} ({} with open places)",
        statuses,
        report.classes_with_vacancy()
    );

    if !report.failed_subjects.is_empty() || !report.failed_courses.is_empty() {
        log_warn!(
            "[pipeline] Failed subjects: [{}], failed courses: [{}]",
            report.failed_subjects.join(", "),
            report.failed_courses.join(", ")
        );
    }

    for warning in &report.warnings {
        log_warn!("[pipeline] Location warning: {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ClientError};
    use crate::extract::test_support::{filler, record};
    use crate::extract::CoursePage;
    use crate::sink::MemorySink;
    use crate::timetable::CourseLink;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubSource {
        subjects: Vec<&'static str>,
        courses: HashMap<&'static str, Vec<&'static str>>,
        pages: HashMap<&'static str, Vec<String>>,
        broken_subjects: Vec<&'static str>,
        index_down: bool,
    }

    fn unreachable(what: &str) -> AppError {
        ClientError::ResponseError {
            status_code: 503,
            message: what.to_string(),
        }
        .into()
    }

    #[async_trait]
    impl PageSource for StubSource {
        async fn subject_areas(&self) -> Result<Vec<SubjectArea>> {
            if self.index_down {
                return Err(unreachable("subject index"));
            }
            Ok(self
                .subjects
                .iter()
                .map(|code| SubjectArea {
                    code: code.to_string(),
                    url: format!("/2025/{}KENS.html", code),
                })
                .collect())
        }

        async fn course_links(&self, subject: &SubjectArea) -> Result<Vec<CourseLink>> {
            if self.broken_subjects.contains(&subject.code.as_str()) {
                return Err(unreachable(&subject.code));
            }
            Ok(self
                .courses
                .get(subject.code.as_str())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|code| CourseLink {
                    code: code.to_string(),
                    url: format!("/2025/{}.html", code),
                })
                .collect())
        }

        async fn course_page(&self, course: &CourseLink) -> Result<CoursePage> {
            let tokens = self
                .pages
                .get(course.code.as_str())
                .cloned()
                .ok_or_else(|| unreachable(&course.code))?;
            Ok(CoursePage {
                course_code: course.code.clone(),
                course_name: String::new(),
                tokens,
            })
        }
    }

    fn page(records: &[Vec<String>]) -> Vec<String> {
        let mut tokens = Vec::new();
        for cells in records {
            tokens.extend(cells.iter().cloned());
            tokens.extend(filler(4));
        }
        tokens.push("Online (ONLINE)".to_string());
        tokens.extend(filler(20));
        tokens
    }

    fn source() -> StubSource {
        StubSource {
            subjects: vec!["COMP", "MATH", "SENG"],
            courses: HashMap::from([
                ("COMP", vec!["COMP1511", "COMP2521", "COMP3311"]),
                ("MATH", vec!["MATH1131"]),
            ]),
            pages: HashMap::from([
                (
                    "COMP1511",
                    page(&[
                        record(1001, "A01", "Lecture", "Open", "10/100", "T3"),
                        record(1002, "T01", "Tutorial", "Full", "20/20", "T3"),
                    ]),
                ),
                (
                    "COMP2521",
                    page(&[
                        record(2001, "A01", "Lecture", "Open", "5/50", "T2"),
                        record(2002, "A01", "Lecture", "Open", "0/0", "T3"),
                    ]),
                ),
                (
                    "MATH1131",
                    page(&[record(3001, "M01", "Lecture", "On Hold", "0/300", "T3")]),
                ),
            ]),
            broken_subjects: vec!["SENG"],
            ..StubSource::default()
        }
    }

    #[tokio::test]
    async fn failures_do_not_abort_the_run() {
        let source = source();
        let sink = MemorySink::new();
        let config = Config::default();

        let report = Pipeline::new(&config, &source, &sink).run().await.unwrap();

        assert_eq!(report.subjects, 3);
        assert_eq!(report.failed_subjects, vec!["SENG".to_string()]);
        // COMP3311 has no page.
        assert_eq!(report.failed_courses, vec!["COMP3311".to_string()]);
        let ids: Vec<_> = report.records.iter().map(|r| r.class_id).collect();
        assert_eq!(ids, vec![1001, 1002, 2001, 3001]);
        assert_eq!(report.written, 4);
        assert_eq!(sink.len().await, 4);
        assert_eq!(
            sink.get("1002").await.unwrap()["mode"],
            json!("Online")
        );
    }

    #[tokio::test]
    async fn filters_by_subject_and_term() {
        let source = source();
        let sink = MemorySink::new();
        let mut config = Config::default();
        config.scrape.subjects = vec!["COMP".to_string()];
        config.scrape.term = Some(Term::T3);
        config.scrape.tag = Some("comp-t3-2025".to_string());

        let report = Pipeline::new(&config, &source, &sink).run().await.unwrap();

        let ids: Vec<_> = report.records.iter().map(|r| r.class_id).collect();
        assert_eq!(ids, vec![1001, 1002]);
        assert!(report.failed_subjects.is_empty());
        assert_eq!(
            sink.get("1001").await.unwrap()["scrapedFor"],
            json!("comp-t3-2025")
        );
    }

    #[tokio::test]
    async fn test_run_limits_subjects() {
        let source = source();
        let sink = MemorySink::new();
        let mut config = Config::default();
        config.scrape.test_run = true;

        let report = Pipeline::new(&config, &source, &sink).scrape().await.unwrap();
        assert_eq!(report.subjects, 1);
        assert_eq!(report.courses, 3);
        assert_eq!(sink.len().await, 0);
    }

    #[tokio::test]
    async fn test_run_limits_courses_per_subject() {
        let codes = vec![
            "ECON1101", "ECON1102", "ECON1203", "ECON2101", "ECON2102", "ECON2206", "ECON3101",
        ];
        let source = StubSource {
            subjects: vec!["ECON"],
            courses: HashMap::from([("ECON", codes.clone())]),
            pages: codes
                .iter()
                .enumerate()
                .map(|(i, code)| {
                    let id = 4001 + i as u32;
                    (*code, page(&[record(id, "A01", "Lecture", "Open", "1/10", "T1")]))
                })
                .collect(),
            ..StubSource::default()
        };
        let sink = MemorySink::new();
        let mut config = Config::default();
        config.scrape.test_run = true;

        let report = Pipeline::new(&config, &source, &sink).scrape().await.unwrap();
        assert_eq!(report.courses, 5);
        let ids: Vec<_> = report.records.iter().map(|r| r.class_id).collect();
        assert_eq!(ids, vec![4001, 4002, 4003, 4004, 4005]);
    }

    #[tokio::test]
    async fn term_filter_drops_warnings_of_filtered_classes() {
        let mut unplaced = record(2003, "T01", "Tutorial", "Open", "3/25", "T2");
        unplaced.extend(filler(30));
        let mut placed = record(2004, "A01", "Lecture", "Open", "3/25", "T3");
        placed.push("Online (ONLINE)".to_string());
        placed.extend(filler(30));
        let source = StubSource {
            subjects: vec!["COMP"],
            courses: HashMap::from([("COMP", vec!["COMP6080", "COMP6443"])]),
            pages: HashMap::from([("COMP6080", unplaced), ("COMP6443", placed)]),
            ..StubSource::default()
        };
        let sink = MemorySink::new();
        let mut config = Config::default();
        config.scrape.term = Some(Term::T3);

        let report = Pipeline::new(&config, &source, &sink).scrape().await.unwrap();
        let ids: Vec<_> = report.records.iter().map(|r| r.class_id).collect();
        assert_eq!(ids, vec![2004]);
        assert!(report.warnings.is_empty());

        config.scrape.term = None;
        let report = Pipeline::new(&config, &source, &sink).scrape().await.unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].class_id, 2003);
    }

    #[tokio::test]
    async fn summary_counts_courses_and_statuses() {
        let source = source();
        let sink = MemorySink::new();
        let report = Pipeline::new(&Config::default(), &source, &sink)
            .scrape()
            .await
            .unwrap();

        let per_course = report.classes_per_course();
        assert_eq!(per_course.get("COMP1511"), Some(&2));
        assert_eq!(per_course.get("MATH1131"), Some(&1));
        let per_status = report.classes_per_status();
        assert_eq!(per_status.get("Open"), Some(&2));
        assert_eq!(per_status.get("Full"), Some(&1));
        assert_eq!(per_status.get("On Hold"), Some(&1));
        // 1002 is 20/20.
        assert_eq!(report.classes_with_vacancy(), 3);
    }

    #[tokio::test]
    async fn unreachable_index_is_fatal() {
        let source = StubSource {
            index_down: true,
            ..StubSource::default()
        };
        let sink = MemorySink::new();
        let result = Pipeline::new(&Config::default(), &source, &sink).run().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_scrape_writes_nothing() {
        let source = StubSource::default();
        let sink = MemorySink::new();
        let report = Pipeline::new(&Config::default(), &source, &sink)
            .run()
            .await
            .unwrap();
        assert_eq!(report.written, 0);
        assert!(sink.batch_sizes().await.is_empty());
    }
}
