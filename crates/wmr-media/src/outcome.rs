//! Tagged results of external tool invocations.

use std::fmt;

use crate::error::{MediaError, MediaResult};

/// Result of running an external tool.
#[derive(Debug)]
pub enum ToolOutcome<T> {
    /// The tool ran and produced the expected output.
    Produced(T),
    /// The tool ran but left nothing usable behind.
    Empty {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    /// The tool could not be run at all.
    Failed(MediaError),
}

impl<T> ToolOutcome<T> {
    /// Classify a finished run.
    ///
    /// `collect` inspects the filesystem for the expected output and is only
    /// consulted when the tool exited successfully.
    pub fn from_run<F>(run: MediaResult<()>, collect: F) -> Self
    where
        F: FnOnce() -> Option<T>,
    {
        match run {
            Ok(()) => match collect() {
                Some(output) => ToolOutcome::Produced(output),
                None => ToolOutcome::Empty {
                    exit_code: Some(0),
                    stderr: None,
                },
            },
            Err(MediaError::ToolExited {
                exit_code: Some(code),
                stderr,
                ..
            }) => ToolOutcome::Empty {
                exit_code: Some(code),
                stderr,
            },
            Err(e) => ToolOutcome::Failed(e),
        }
    }

    /// Nothing to do, and nothing went wrong.
    pub fn skipped() -> Self {
        ToolOutcome::Empty {
            exit_code: None,
            stderr: None,
        }
    }

    pub fn is_produced(&self) -> bool {
        matches!(self, ToolOutcome::Produced(_))
    }

    pub fn produced(self) -> Option<T> {
        match self {
            ToolOutcome::Produced(output) => Some(output),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolOutcome::Produced(_) => "produced",
            ToolOutcome::Empty { .. } => "empty",
            ToolOutcome::Failed(_) => "failed",
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ToolOutcome<U> {
        match self {
            ToolOutcome::Produced(output) => ToolOutcome::Produced(f(output)),
            ToolOutcome::Empty { exit_code, stderr } => ToolOutcome::Empty { exit_code, stderr },
            ToolOutcome::Failed(e) => ToolOutcome::Failed(e),
        }
    }
}

impl<T> fmt::Display for ToolOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Produced(_) => write!(f, "produced output"),
            ToolOutcome::Empty {
                exit_code: Some(code),
                stderr,
            } => {
                write!(f, "exited with status {} and produced no output", code)?;
                if let Some(stderr) = stderr.as_deref().filter(|s| !s.is_empty()) {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            ToolOutcome::Empty { exit_code: None, .. } => write!(f, "produced no output"),
            ToolOutcome::Failed(e) => write!(f, "could not run: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_output() {
        let outcome = ToolOutcome::from_run(Ok(()), || Some(3));
        assert!(outcome.is_produced());
        assert_eq!(outcome.produced(), Some(3));
    }

    #[test]
    fn test_success_without_output_is_empty() {
        let outcome: ToolOutcome<u32> = ToolOutcome::from_run(Ok(()), || None);
        assert!(matches!(outcome, ToolOutcome::Empty { exit_code: Some(0), .. }));
    }

    #[test]
    fn test_non_zero_exit_is_empty() {
        let run = Err(MediaError::tool_exited(
            "ffmpeg",
            Some(1),
            Some("Invalid data found when processing input".to_string()),
        ));
        let outcome: ToolOutcome<u32> = ToolOutcome::from_run(run, || -> Option<u32> { panic!("not consulted") });
        assert_eq!(outcome.as_str(), "empty");
        assert!(outcome.to_string().contains("Invalid data"));
    }

    #[test]
    fn test_missing_binary_is_failed() {
        let outcome: ToolOutcome<u32> =
            ToolOutcome::from_run(Err(MediaError::ToolMissing("ffmpeg")), || Some(1));
        assert!(matches!(outcome, ToolOutcome::Failed(MediaError::ToolMissing("ffmpeg"))));
    }
}
