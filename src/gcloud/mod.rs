//! gcloud CLI integration
//!
//! Every interaction with Google Cloud goes through the `gcloud` command
//! line tool. Commands are built as plain values, then handed to a
//! [`runner::CommandRunner`].
//!
//! # Module Structure
//!
//! - [`command`] - Command and result types, optional flag expansion
//! - [`builders`] - Describe, create/update, list and upload commands
//! - [`runner`] - Process execution behind the `CommandRunner` trait
//! - [`checks`] - Resource existence checks
//! - [`project`] - Project metadata and enabled services
//!
//! # Example
//!
//! ```ignore
//! use crate::gcloud::{checks, runner::ProcessRunner};
//!
//! fn example(config: &Config) -> bool {
//!     checks::bucket_exists(&ProcessRunner, config)
//! }
//! ```

pub mod builders;
pub mod checks;
pub mod command;
pub mod project;
pub mod runner;
