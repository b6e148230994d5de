use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use super::request::{InvocationRequest, OutputHandler};
use crate::error::{ReleaseError, Result};

/// Runs the build tool
#[derive(Debug, Clone)]
pub struct Invoker {
    executable: PathBuf,
    working_directory: Option<PathBuf>,
}

impl Invoker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Invoker {
            executable: executable.into(),
            working_directory: None,
        }
    }

    /// Directory used when a request does not name one
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run the request to completion
    ///
    /// # Returns
    /// * `Ok(code)` - The exit code, `-1` when the process was killed by a signal
    /// * `Err` - If the process could not be started or its output not read
    pub fn execute(
        &self,
        request: InvocationRequest,
        output: &mut dyn OutputHandler,
        errors: &mut dyn OutputHandler,
    ) -> Result<i32> {
        let InvocationRequest {
            args,
            working_directory,
            interactive,
            input,
            env,
        } = request;

        let mut cmd = Command::new(&self.executable);
        cmd.args(&args)
            .envs(env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_directory.as_ref().or(self.working_directory.as_ref()) {
            cmd.current_dir(dir);
        }

        let input = match (interactive, input) {
            (true, Some(input)) => Some(input),
            (true, None) => {
                tracing::warn!(
                    "{} will be executed in interactive mode, but no input stream has been configured",
                    self.executable.display()
                );
                None
            }
            (false, Some(_)) => {
                tracing::info!("Executing in batch mode. The configured input stream will be ignored.");
                None
            }
            (false, None) => None,
        };
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        tracing::debug!("Executing: {} {}", self.executable.display(), args.join(" "));
        let mut child = cmd.spawn().map_err(|e| {
            ReleaseError::invocation(format!(
                "Failed to execute {}: {}",
                self.executable.display(),
                e
            ))
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        thread::scope(|scope| -> Result<()> {
            let feeder = match (input, stdin) {
                (Some(mut input), Some(mut stdin)) => Some(scope.spawn(move || {
                    // The child may exit without reading everything.
                    let _ = io::copy(&mut input, &mut stdin);
                })),
                _ => None,
            };
            let error_pump = stderr.map(|pipe| scope.spawn(move || pump_lines(pipe, errors)));

            let pumped = match stdout {
                Some(pipe) => pump_lines(pipe, output),
                None => Ok(()),
            };

            if let Some(handle) = error_pump {
                handle
                    .join()
                    .map_err(|_| ReleaseError::invocation("error stream reader panicked"))??;
            }
            if let Some(handle) = feeder {
                handle
                    .join()
                    .map_err(|_| ReleaseError::invocation("input stream writer panicked"))?;
            }
            pumped.map_err(ReleaseError::from)
        })?;

        let status = child.wait()?;
        Ok(status.code().unwrap_or(-1))
    }
}

fn pump_lines<R: Read>(pipe: R, handler: &mut dyn OutputHandler) -> io::Result<()> {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        handler.consume_line(line.trim_end_matches(['\n', '\r']));
    }
}
