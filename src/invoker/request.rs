use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// Receives the child's output one line at a time
pub trait OutputHandler: Send {
    fn consume_line(&mut self, line: &str);
}

impl<F> OutputHandler for F
where
    F: FnMut(&str) + Send,
{
    fn consume_line(&mut self, line: &str) {
        self(line)
    }
}

/// Forwards lines to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput {
    pub to_stderr: bool,
}

impl OutputHandler for ConsoleOutput {
    fn consume_line(&mut self, line: &str) {
        if self.to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// A single run of the build tool
#[derive(Default)]
pub struct InvocationRequest {
    pub args: Vec<String>,
    /// Overrides the invoker's working directory
    pub working_directory: Option<PathBuf>,
    pub interactive: bool,
    pub input: Option<Box<dyn Read + Send>>,
    pub env: Vec<(String, String)>,
}

impl InvocationRequest {
    /// Batch-mode request with the given arguments
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InvocationRequest {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_input(mut self, input: impl Read + Send + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Debug for InvocationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationRequest")
            .field("args", &self.args)
            .field("working_directory", &self.working_directory)
            .field("interactive", &self.interactive)
            .field("input", &self.input.is_some())
            .field("env", &self.env)
            .finish()
    }
}
