//! Scrapes class availability from a university timetable site.
//!
//! Course pages expose their class tables only as a flat run of text cells. The
//! [`extract`] module rebuilds structured [`model::ClassRecord`]s from that run, and the
//! [`pipeline`] persists them as merge-upserts through a [`sink::DocumentSink`].

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod timetable;
pub mod utils;
