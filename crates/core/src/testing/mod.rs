//! Testing utilities and mock implementations.
//!
//! Conversion steps only reach external programs through
//! [`ToolRunner`](crate::tool::ToolRunner), so a [`MockToolRunner`] plus the
//! [`fixtures::FakeTools`] simulator is enough to drive whole batches in
//! tests without ffmpeg, 7-Zip or LibreOffice installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use fileforge_core::testing::{fixtures, MockToolRunner};
//!
//! let tools = fixtures::FakeTools::new()
//!     .with_archive("a.zip", &[("inner.tar", "archive")])
//!     .with_archive("inner.tar", &[("readme.txt", "hello")]);
//! let runner = Arc::new(MockToolRunner::with_handler(tools.handler()));
//!
//! let (status, mut rx) = create_status_channel(64);
//! let batch = BatchRunner::for_domain(Domain::Archive, runner.clone(), &config, status);
//! ```

mod mock_tool_runner;

pub use mock_tool_runner::{MockToolRunner, ToolHandler};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use tokio::sync::mpsc;

    use crate::batch::ConversionRequest;
    use crate::config::Config;
    use crate::status::{StatusEnvelope, StatusEvent};
    use crate::tool::{ToolError, ToolInvocation};

    /// Create a config whose output folder is `folder`.
    pub fn config_with_output(folder: &Path) -> Config {
        let mut config = Config::default();
        config.output.folder = Some(folder.to_path_buf());
        config
    }

    /// Create a request with an explicit target.
    pub fn request(path: impl Into<PathBuf>, target: &str) -> ConversionRequest {
        ConversionRequest::new(path, target)
    }

    /// Write `contents` to `dir/name` and return the path.
    pub fn input_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write input fixture");
        path
    }

    /// Drain every queued status event without waiting.
    pub fn drain_events(rx: &mut mpsc::Receiver<StatusEnvelope>) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            events.push(envelope.event);
        }
        events
    }

    /// Simulates 7-Zip, ffmpeg and LibreOffice on the local filesystem.
    ///
    /// - `7z x <archive> -o<dir> -y` writes the entries registered with
    ///   [`FakeTools::with_archive`] for the archive's file name into `<dir>`,
    ///   and fails like 7-Zip for unknown archives.
    /// - `7z a -t<type> <out> <src>` writes `<out>` listing the packed names
    ///   (`*` expands to the working directory's entries).
    /// - `ffmpeg ... -i <in> ... <out>` writes `<out>`, failing if `<in>` is
    ///   missing.
    /// - `soffice --convert-to <t> --outdir <dir> <in>` writes
    ///   `<dir>/<stem>.<t>`.
    #[derive(Debug, Clone, Default)]
    pub struct FakeTools {
        archives: HashMap<String, Vec<(String, String)>>,
    }

    impl FakeTools {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register the entries extracted from any archive named `name`.
        pub fn with_archive(mut self, name: &str, entries: &[(&str, &str)]) -> Self {
            self.archives.insert(
                name.to_string(),
                entries
                    .iter()
                    .map(|(n, c)| (n.to_string(), c.to_string()))
                    .collect(),
            );
            self
        }

        /// Turn the simulator into a handler for [`super::MockToolRunner`].
        pub fn handler(
            self,
        ) -> impl Fn(&ToolInvocation) -> Result<(), ToolError> + Send + Sync + 'static {
            move |invocation| self.simulate(invocation)
        }

        fn simulate(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
            let program = invocation.program_name().to_ascii_lowercase();
            let args = invocation.args_lossy();

            if program.contains("7z") {
                self.seven_zip(invocation, &args)
            } else if program.contains("ffmpeg") {
                Self::ffmpeg(invocation, &args)
            } else if program.contains("soffice") || program.contains("libreoffice") {
                Self::soffice(invocation, &args)
            } else {
                Ok(())
            }
        }

        fn seven_zip(&self, invocation: &ToolInvocation, args: &[String]) -> Result<(), ToolError> {
            match args.first().map(String::as_str) {
                Some("x") => {
                    let archive = Path::new(args.get(1).ok_or_else(|| usage_error(invocation))?);
                    let out = args
                        .iter()
                        .find_map(|a| a.strip_prefix("-o"))
                        .map(PathBuf::from)
                        .ok_or_else(|| usage_error(invocation))?;

                    let name = archive
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let entries = self.archives.get(&name).ok_or_else(|| {
                        ToolError::invocation_failed(
                            invocation.program.clone(),
                            2,
                            &format!("ERROR: {}\nCan not open the file as archive", archive.display()),
                        )
                    })?;

                    std::fs::create_dir_all(&out).map_err(|e| io_error(invocation, e))?;
                    for (entry, contents) in entries {
                        std::fs::write(out.join(entry), contents)
                            .map_err(|e| io_error(invocation, e))?;
                    }
                    Ok(())
                }
                Some("a") => {
                    let out = PathBuf::from(args.get(2).ok_or_else(|| usage_error(invocation))?);
                    let source = args.get(3).ok_or_else(|| usage_error(invocation))?;

                    let packed = if source == "*" {
                        let cwd = invocation
                            .working_dir
                            .as_ref()
                            .ok_or_else(|| usage_error(invocation))?;
                        let mut names: Vec<String> = std::fs::read_dir(cwd)
                            .map_err(|e| io_error(invocation, e))?
                            .filter_map(|e| e.ok())
                            .map(|e| e.file_name().to_string_lossy().to_string())
                            .collect();
                        names.sort();
                        names
                    } else {
                        vec![source.clone()]
                    };

                    std::fs::write(&out, packed.join("\n")).map_err(|e| io_error(invocation, e))
                }
                _ => Err(usage_error(invocation)),
            }
        }

        fn ffmpeg(invocation: &ToolInvocation, args: &[String]) -> Result<(), ToolError> {
            let input = args
                .iter()
                .position(|a| a == "-i")
                .and_then(|i| args.get(i + 1))
                .ok_or_else(|| usage_error(invocation))?;
            if !Path::new(input).exists() {
                return Err(ToolError::invocation_failed(
                    invocation.program.clone(),
                    1,
                    &format!("{}: No such file or directory", input),
                ));
            }

            let output = args.last().ok_or_else(|| usage_error(invocation))?;
            std::fs::write(output, "converted").map_err(|e| io_error(invocation, e))
        }

        fn soffice(invocation: &ToolInvocation, args: &[String]) -> Result<(), ToolError> {
            let value_after = |flag: &str| {
                args.iter()
                    .position(|a| a == flag)
                    .and_then(|i| args.get(i + 1))
                    .cloned()
            };
            let target = value_after("--convert-to").ok_or_else(|| usage_error(invocation))?;
            let outdir = value_after("--outdir").ok_or_else(|| usage_error(invocation))?;
            let input = PathBuf::from(args.last().ok_or_else(|| usage_error(invocation))?);

            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            std::fs::write(
                Path::new(&outdir).join(format!("{}.{}", stem, target)),
                "converted",
            )
            .map_err(|e| io_error(invocation, e))
        }
    }

    fn usage_error(invocation: &ToolInvocation) -> ToolError {
        ToolError::invocation_failed(
            invocation.program.clone(),
            7,
            &format!("unexpected command line: {}", invocation),
        )
    }

    fn io_error(invocation: &ToolInvocation, e: std::io::Error) -> ToolError {
        ToolError::invocation_failed(invocation.program.clone(), 2, &e.to_string())
    }
}
