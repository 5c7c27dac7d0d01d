mod content;
mod index;

pub use content::ContentScraper;
pub use index::{CourseLink, IndexScraper, SubjectArea};

use scraper::Html;

/// A parsed timetable page.
pub struct TimetableDocument {
    document: Html,
}

impl TimetableDocument {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Subject and course links on index pages.
    pub fn index(&self) -> IndexScraper<'_> {
        IndexScraper::new(&self.document)
    }

    /// Heading and visible data cells on course pages.
    pub fn content(&self) -> ContentScraper<'_> {
        ContentScraper::new(&self.document)
    }
}
