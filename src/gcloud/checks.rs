//! Existence checks
//!
//! Each check runs a describe command and reports its success flag. A
//! failed describe is read as "absent" whatever the cause.

use super::builders;
use super::runner::CommandRunner;
use crate::config::Config;

pub fn bucket_exists<R: CommandRunner + ?Sized>(runner: &R, config: &Config) -> bool {
    runner.run(&builders::bucket_describe(config)).success
}

pub fn service_account_exists<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &Config,
    email: &str,
) -> bool {
    runner
        .run(&builders::service_account_describe(config, email))
        .success
}

pub fn job_exists<R: CommandRunner + ?Sized>(runner: &R, config: &Config) -> bool {
    runner.run(&builders::job_describe(config)).success
}

pub fn scheduler_exists<R: CommandRunner + ?Sized>(runner: &R, config: &Config) -> bool {
    runner.run(&builders::scheduler_describe(config)).success
}
