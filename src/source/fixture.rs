use super::{parse_course_page, PageSource};
use crate::error::Result;
use crate::extract::CoursePage;
use crate::timetable::{CourseLink, SubjectArea};
use crate::utils;
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static COURSE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{4})\d{4}$").expect("invalid regex: course file"));

/// Replays course pages saved as `<dir>/<COURSE>.html`.
///
/// Subjects are the distinct four-letter prefixes of the saved course codes.
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn saved_courses(&self) -> Result<Vec<CourseLink>> {
        let courses = utils::read_html_files(&self.dir)?
            .into_iter()
            .filter_map(|(path, _)| {
                let code = path.file_stem()?.to_str()?.to_string();
                COURSE_FILE.is_match(&code).then(|| CourseLink {
                    code,
                    url: path.to_string_lossy().into_owned(),
                })
            })
            .collect();
        Ok(courses)
    }
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn subject_areas(&self) -> Result<Vec<SubjectArea>> {
        let codes: BTreeSet<String> = self
            .saved_courses()?
            .into_iter()
            .map(|course| course.code[..4].to_string())
            .collect();

        Ok(codes
            .into_iter()
            .map(|code| SubjectArea {
                code,
                url: self.dir.to_string_lossy().into_owned(),
            })
            .collect())
    }

    async fn course_links(&self, subject: &SubjectArea) -> Result<Vec<CourseLink>> {
        Ok(self
            .saved_courses()?
            .into_iter()
            .filter(|course| course.code.starts_with(&subject.code))
            .collect())
    }

    async fn course_page(&self, course: &CourseLink) -> Result<CoursePage> {
        let html = std::fs::read_to_string(Path::new(&course.url))?;
        parse_course_page(&html, course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><table>
        <tr><td>COMP1511 Programming Fundamentals</td></tr>
        <tr><td class="data">12345</td><td class="data">T18A</td></tr>
    </table></body></html>"#;

    #[tokio::test]
    async fn groups_saved_pages_by_subject() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["COMP1511", "COMP2521", "MATH1131"] {
            utils::save_html(PAGE, dir.path(), name).unwrap();
        }
        utils::save_html(PAGE, dir.path(), "index").unwrap();

        let source = FixtureSource::new(dir.path());
        let subjects = source.subject_areas().await.unwrap();
        let codes: Vec<_> = subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["COMP", "MATH"]);

        let courses = source.course_links(&subjects[0]).await.unwrap();
        let codes: Vec<_> = courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["COMP1511", "COMP2521"]);

        let page = source.course_page(&courses[0]).await.unwrap();
        assert_eq!(page.course_code, "COMP1511");
        assert_eq!(page.course_name, "Programming Fundamentals");
        assert_eq!(page.tokens, vec!["12345", "T18A"]);
    }
}
