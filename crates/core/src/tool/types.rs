//! Types for the tool module.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single external process invocation: program, arguments and optional
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
}

impl ToolInvocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the process from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Arguments as lossy strings, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    /// Whether any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// File name of the program, e.g. `ffmpeg` for `/usr/bin/ffmpeg`.
    pub fn program_name(&self) -> String {
        program_name(&self.program)
    }
}

pub(crate) fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

impl fmt::Display for ToolInvocation {
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
    fn test_builder() {
        let inv = ToolInvocation::new("/usr/bin/7zz")
            .arg("a")
            .args(["-tzip", "out.zip", "*"])
            .current_dir("/tmp/stage");

        assert_eq!(inv.program_name(), "7zz");
        assert_eq!(inv.args_lossy(), vec!["a", "-tzip", "out.zip", "*"]);
        assert_eq!(inv.working_dir, Some(PathBuf::from("/tmp/stage")));
        assert!(inv.has_arg("*"));
        assert!(!inv.has_arg("-ttar"));
        assert_eq!(inv.to_string(), "/usr/bin/7zz a -tzip out.zip *");
    }
}
