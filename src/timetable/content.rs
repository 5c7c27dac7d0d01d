use crate::error::{Result, ScraperError};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// `COMP1511 Programming Fundamentals`
static COURSE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{4}\d{4})\s+(.+)$").expect("invalid regex: course heading")
});

pub struct ContentScraper<'a> {
    document: &'a Html,
}

impl<'a> ContentScraper<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        Self { document }
    }

    /// Text of every `.data` cell in document order, trimmed with inner whitespace collapsed.
    /// Empty cells are kept so offsets match the rendered table.
    pub fn tokens(&self) -> Result<Vec<String>> {
        let selector =
            Selector::parse(".data").map_err(|e| ScraperError::SelectorError(e.to_string()))?;

        Ok(self
            .document
            .select(&selector)
            .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
            .collect())
    }

    /// Course code and name from the first `CODE name` line on the page.
    pub fn heading(&self) -> Option<(String, String)> {
        self.document.root_element().text().find_map(|text| {
            let caps = COURSE_HEADING.captures(text.trim())?;
            let name = caps[2]
                .split("Faculty")
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Some((caps[1].to_string(), name))
        })
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
