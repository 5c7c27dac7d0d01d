use super::{parse_course_page, PageSource};
use crate::client::Client;
use crate::config::Config;
use crate::error::Result;
use crate::extract::CoursePage;
use crate::timetable::{CourseLink, SubjectArea, TimetableDocument};
use crate::utils;
use crate::{log_debug, log_info, log_warn};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";

/// Loads pages from the timetable site, retrying transient failures.
pub struct LiveSource {
    client: Client,
    base_url: String,
    subject_index_path: String,
    max_retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
    fixture_dir: Option<String>,
}

impl LiveSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .base_url(&config.base_url)
            .header("user-agent", USER_AGENT)?
            .header("accept-language", "en-US,en;q=0.7")?
            .timeout(Duration::from_secs(30))
            .chrome_impersonation(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            subject_index_path: config.subject_index_path.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay),
            request_delay: Duration::from_millis(config.request_delay_ms),
            fixture_dir: config
                .scrape
                .record_fixtures
                .then(|| config.scrape.fixture_dir.clone()),
        })
    }

    async fn fetch(&self, path: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.client.get(path).await {
                Ok(response) => {
                    log_debug!(
                        "[live] {} -> {} ({} bytes)",
                        path,
                        response.status,
                        response.content.len()
                    );
                    tokio::time::sleep(self.request_delay).await;
                    return Ok(response.content);
                }
                Err(e) if attempt < self.max_retries => {
                    log_warn!(
                        "[live] Fetching {} failed (attempt {}/{}): {}",
                        path,
                        attempt,
                        self.max_retries,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn subject_index_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.subject_index_path
        )
    }
}

#[async_trait]
impl PageSource for LiveSource {
    async fn subject_areas(&self) -> Result<Vec<SubjectArea>> {
        let url = self.subject_index_url();
        log_info!("[live] Loading subject index from {}", url);
        let html = self.fetch(&url).await?;
        TimetableDocument::new(&html)
            .index()
            .with_base_url(url)
            .subject_areas()
    }

    async fn course_links(&self, subject: &SubjectArea) -> Result<Vec<CourseLink>> {
        let html = self.fetch(&subject.url).await?;
        TimetableDocument::new(&html)
            .index()
            .with_base_url(subject.url.as_str())
            .course_links()
    }

    async fn course_page(&self, course: &CourseLink) -> Result<CoursePage> {
        let html = self.fetch(&course.url).await?;
        if let Some(dir) = &self.fixture_dir {
            utils::save_html(&html, dir, &course.code)?;
        }
        parse_course_page(&html, course)
    }
}
