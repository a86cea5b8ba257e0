//! Small file-processing pipeline.
//!
//! Bootstraps a project layout, writes sample text in several encodings,
//! swapcases it into UTF-8, describes the results as JSON checked by a
//! hand-written schema validator, and backs the data folder up to a zip
//! archive that can be restored.
//!
//! The validator in [`validator`] is pure: it returns [`validator::Violation`]
//! values and leaves logging and printing to [`report`] and the CLI.

pub mod config;
pub mod encoding;
pub mod error;
pub mod fileinfo;
pub mod logging;
pub mod outcome;
pub mod report;
pub mod steps;
pub mod validator;

pub mod schema;
