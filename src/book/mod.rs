//! Book model
//!
//! Typed book, chapter and media records, plus the request payloads that
//! are coerced into them at the API boundary.

mod payload;
mod types;

pub use payload::{BookPayload, ChapterPayload};
pub use types::{
    Book, BookCover, BookFormat, Chapter, CoverType, Media, MediaType, UnknownFormat,
};
