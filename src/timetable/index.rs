use crate::error::{Result, ScraperError};
use crate::log_info;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static SUBJECT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}$").expect("invalid regex: subject code"));

/// Subject pages live at `/<year>/<CODE>KENS.html`.
static SUBJECT_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d{4}/[A-Z]{4}KENS\.html$").expect("invalid regex: subject href")
});

static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}\d{4}$").expect("invalid regex: course code"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectArea {
    pub code: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLink {
    pub code: String,
    pub url: String,
}

pub struct IndexScraper<'a> {
    document: &'a Html,
    base_url: String,
}

impl<'a> IndexScraper<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        Self {
            document,
            base_url: "https://timetable.unsw.edu.au".to_string(),
        }
    }

    /// Base used to resolve relative links. Pass the URL the page was loaded from.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn subject_areas(&self) -> Result<Vec<SubjectArea>> {
        let subjects: Vec<SubjectArea> = self
            .links()?
            .into_iter()
            .filter(|(text, url)| SUBJECT_CODE.is_match(text) && SUBJECT_HREF.is_match(url))
            .map(|(code, url)| SubjectArea { code, url })
            .collect();

        log_info!("[timetable] Found {} subject areas", subjects.len());
        Ok(subjects)
    }

    /// Course links in page order, each course once.
    pub fn course_links(&self) -> Result<Vec<CourseLink>> {
        let mut seen = HashSet::new();
        let courses: Vec<CourseLink> = self
            .links()?
            .into_iter()
            .filter(|(text, url)| COURSE_CODE.is_match(text) && url.contains(".html"))
            .filter(|(text, _)| seen.insert(text.clone()))
            .map(|(code, url)| CourseLink { code, url })
            .collect();

        log_info!("[timetable] Found {} course links", courses.len());
        Ok(courses)
    }

    /// `(trimmed text, absolute href)` of every anchor with an href.
    fn links(&self) -> Result<Vec<(String, String)>> {
        let selector =
            Selector::parse("a[href]").map_err(|e| ScraperError::SelectorError(e.to_string()))?;
        let base = Url::parse(&self.base_url)
            .map_err(|e| ScraperError::ParseError(format!("Invalid base URL: {}", e)))?;

        Ok(self
            .document
            .select(&selector)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let url = base.join(href).ok()?;
                let text = anchor.text().collect::<String>().trim().to_string();
                Some((text, url.to_string()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::timetable::TimetableDocument;

    const SUBJECT_SEARCH: &str = r#"
        <html><body><table>
          <tr><td><a href="COMPKENS.html">COMP</a></td><td>Computer Science</td></tr>
          <tr><td><a href="/2025/MATHKENS.html">MATH</a></td><td>Mathematics</td></tr>
          <tr><td><a href="/2025/help.html">HELP</a></td></tr>
          <tr><td><a href="/2025/SENGKENS.html">Software Engineering</a></td></tr>
        </table></body></html>
    "#;

    const SUBJECT_PAGE: &str = r#"
        <html><body>
          <a href="COMP1511.html">COMP1511</a> <a href="COMP1511.html">COMP1511</a>
          <a href="COMP2521.html">COMP2521</a>
          <a href="/2025/COMPKENS.html">COMP</a>
          <a href="mailto:help@example.com">COMP9999</a>
        </body></html>
    "#;

    #[test]
    fn finds_subject_areas_by_code_and_href() {
        let document = TimetableDocument::new(SUBJECT_SEARCH);
        let subjects = document
            .index()
            .with_base_url("https://timetable.unsw.edu.au/2025/subjectSearch.html")
            .subject_areas()
            .unwrap();

        let codes: Vec<_> = subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["COMP", "MATH"]);
        assert_eq!(
            subjects[0].url,
            "https://timetable.unsw.edu.au/2025/COMPKENS.html"
        );
    }

    #[test]
    fn finds_each_course_once() {
        let document = TimetableDocument::new(SUBJECT_PAGE);
        let courses = document
            .index()
            .with_base_url("https://timetable.unsw.edu.au/2025/COMPKENS.html")
            .course_links()
            .unwrap();

        let codes: Vec<_> = courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["COMP1511", "COMP2521"]);
        assert_eq!(
            courses[1].url,
            "https://timetable.unsw.edu.au/2025/COMP2521.html"
        );
    }
}
