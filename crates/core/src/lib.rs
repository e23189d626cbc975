//! Domain building blocks shared by the database and API crates.
//!
//! Nothing in here performs I/O: the types, the project metadata document,
//! the ownership policy, and the input validation rules are all pure.

pub mod error;
pub mod metadata;
pub mod ownership;
pub mod types;
pub mod validation;
