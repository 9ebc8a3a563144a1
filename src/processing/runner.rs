//! Running the converter process

use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};

use tracing::debug;

use super::command::ConvertCommand;

/// Outcome of a finished converter process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn exited(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Executes a composed converter command.
///
/// The request only looks at the destination file after `run` returns, so
/// implementations are free to report failures however suits them.
pub trait CommandRunner {
    /// Run the command to completion
    fn run(&self, command: &ConvertCommand) -> io::Result<RunStatus>;
}

/// Runs the converter as a child process and blocks until it exits.
///
/// stdin is closed, stdout is discarded and stderr is passed through to
/// the caller's terminal. There is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ConvertCommand) -> io::Result<RunStatus> {
        debug!("Running converter: {}", command);

        let status = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(status.into())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Runner that records commands and optionally writes the destination
    /// (the last argument) as a stand-in for a real converter.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub commands: Mutex<Vec<Vec<String>>>,
        pub write_output: bool,
        pub exit_code: i32,
    }

    impl RecordingRunner {
        pub fn producing_output() -> Self {
            Self {
                write_output: true,
                ..Default::default()
            }
        }

        pub fn without_output(exit_code: i32) -> Self {
            Self {
                exit_code,
                ..Default::default()
            }
        }

        pub fn recorded(&self) -> Vec<Vec<String>> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &ConvertCommand) -> io::Result<RunStatus> {
            let mut line = vec![command.program().to_string_lossy().into_owned()];
            line.extend(command.args_lossy());
            self.commands.lock().unwrap().push(line);

            if self.write_output {
                if let Some(dest) = command.get_args().last() {
                    std::fs::write(PathBuf::from(dest), b"converted")?;
                }
            }

            Ok(RunStatus::exited(self.exit_code))
        }
    }

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::exited(0).to_string(), "exit status 0");
        assert!(RunStatus::exited(0).success);
        assert!(!RunStatus::exited(1).success);

        let killed = RunStatus {
            success: false,
            code: None,
        };
        assert_eq!(killed.to_string(), "terminated by signal");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let command = ConvertCommand::new("/nonexistent/magick-convert-test-binary").arg("x");
        assert!(SystemRunner::new().run(&command).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let command = ConvertCommand::new("sh").args(["-c", "exit 3"]);
        let status = SystemRunner::new().run(&command).unwrap();
        assert_eq!(status, RunStatus::exited(3));
    }
}
