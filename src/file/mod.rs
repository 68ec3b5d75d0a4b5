//! File I/O for the command-line front end.
//!
//! This module loads input documents, templates and requests from disk or
//! stdin, and writes combined results back out as JSON or YAML.

pub mod loader;
pub mod saver;
