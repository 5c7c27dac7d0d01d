//! Where course pages come from: the live timetable site or pages saved on disk.

mod fixture;
mod live;

pub use fixture::FixtureSource;
pub use live::LiveSource;

use crate::error::Result;
use crate::extract::CoursePage;
use crate::timetable::{CourseLink, SubjectArea, TimetableDocument};
use async_trait::async_trait;

/// Yields the flat token sequence of each course page, subject by subject.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn subject_areas(&self) -> Result<Vec<SubjectArea>>;

    async fn course_links(&self, subject: &SubjectArea) -> Result<Vec<CourseLink>>;

    async fn course_page(&self, course: &CourseLink) -> Result<CoursePage>;
}

/// Tokenizes a course page. The link's code stands in when the page has no heading.
pub(crate) fn parse_course_page(html: &str, course: &CourseLink) -> Result<CoursePage> {
    let document = TimetableDocument::new(html);
    let content = document.content();
    let tokens = content.tokens()?;
    let (course_code, course_name) = content
        .heading()
        .unwrap_or_else(|| (course.code.clone(), String::new()));

    Ok(CoursePage {
        course_code,
        course_name,
        tokens,
    })
}
