//! Blog Book Server Library
//!
//! Turns a collection of blog articles into a downloadable book.
//!
//! # Modules
//!
//! - `html`: Sanitizing scraped HTML and deriving plain text
//! - `export`: Building PDF-like and EPUB-like documents
//! - `book`: Book, chapter and media types
//! - `article`: Fetching articles and extracting their content
//! - `routes`: HTTP API

pub mod article;
pub mod book;
pub mod config;
pub mod error;
pub mod export;
pub mod html;
pub mod routes;
pub mod state;
