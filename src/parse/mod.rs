//! Reshaping of the raw sheets into node and relationship tables.

pub mod metadata;
pub mod strain;
