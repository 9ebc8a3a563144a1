//! Converter invocation as a program plus discrete arguments

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A fully composed converter invocation.
///
/// Arguments are kept as separate values and handed to the OS one by one,
/// so paths with spaces or shell metacharacters reach the converter
/// unchanged. The `Display` form is for logs and dry runs only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ConvertCommand {
    /// Start a command for the given converter executable
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as lossy UTF-8 strings
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Build a `std::process::Command` with the same program and arguments
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for ConvertCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_kept_separate() {
        let command = ConvertCommand::new("convert")
            .arg("my photo.jpg")
            .args(["-quality", "90"])
            .arg("out; rm -rf x.jpg");

        assert_eq!(command.program(), Path::new("convert"));
        assert_eq!(
            command.args_lossy(),
            vec!["my photo.jpg", "-quality", "90", "out; rm -rf x.jpg"]
        );
    }

    #[test]
    fn test_display_joins_with_spaces() {
        let command = ConvertCommand::new("/usr/bin/convert").args(["a.jpg", "-flatten", "b.jpg"]);
        assert_eq!(command.to_string(), "/usr/bin/convert a.jpg -flatten b.jpg");
    }

    #[test]
    fn test_to_command_preserves_program_and_args() {
        let command = ConvertCommand::new("magick").args(["in.png", "out.jpg"]);
        let std_command = command.to_command();

        assert_eq!(std_command.get_program(), OsStr::new("magick"));
        let args: Vec<&OsStr> = std_command.get_args().collect();
        assert_eq!(args, vec![OsStr::new("in.png"), OsStr::new("out.jpg")]);
    }
}
