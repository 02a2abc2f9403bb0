//! gcloud command model
//!
//! A [`GcloudCommand`] is a program plus an ordered token list and the
//! options telling the runner how to treat a failure. Building one never
//! executes anything.

use std::fmt;

/// Expand an optional flag into its tokens.
///
/// An absent value yields no tokens at all, so a flag is never emitted
/// without its value.
pub fn optional_param(flag: &str, value: Option<&str>) -> Vec<String> {
    match value {
        Some(value) => vec![flag.to_string(), value.to_string()],
        None => Vec::new(),
    }
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudCommand {
    pub program: String,
    pub args: Vec<String>,
    /// A failure is fatal to the calling procedure
    pub exit_on_error: bool,
    /// A failure is logged by the runner
    pub log_error: bool,
}

impl GcloudCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: "gcloud".to_string(),
            args: args.into_iter().map(Into::into).collect(),
            exit_on_error: true,
            log_error: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag and its value
    pub fn flag(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.into());
        self
    }

    /// Append a flag only when a value is present
    pub fn optional(mut self, flag: &str, value: Option<&str>) -> Self {
        self.args.extend(optional_param(flag, value));
        self
    }

    pub fn json_output(self) -> Self {
        self.flag("--format", "json")
    }

    /// Failures are neither fatal nor logged by the runner
    pub fn quiet(mut self) -> Self {
        self.exit_on_error = false;
        self.log_error = false;
        self
    }
}

#[cfg(test)]
impl GcloudCommand {
    /// Value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

impl fmt::Display for GcloudCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

/// Outcome of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    /// stdout on success, error text on failure
    pub message: String,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
