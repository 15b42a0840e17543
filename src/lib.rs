//! Core library for the synbiochem-db command line application.
//!
//! The library turns a plate metadata sheet and a strain layout sheet into
//! node and relationship files for a graph database bulk import. Sheet
//! readers and the file emitter live under [`io`], table types in [`model`],
//! the reshaping rules in [`parse`], the importer hand-off in [`import`], and
//! the end-to-end orchestration in [`convert`].

pub mod config;
pub mod convert;
pub mod error;
pub mod import;
pub mod io;
pub mod model;
pub mod parse;

pub use error::{Result, ToolError};
