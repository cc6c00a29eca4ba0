use std::{io, path, sync::Arc};

use crate::defaults::Silent;
use crate::narrange::Factories;

pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ExitCallback = Arc<dyn Fn() + Send + Sync>;
pub type DoneCallback = Arc<dyn Fn(Option<i32>) + Send + Sync>;

/// Receives the error (if any), stdout and stderr of a finished narrange process.
pub type MainHandler = Arc<dyn Fn(Option<&io::Error>, &str, &str) + Send + Sync>;
/// Receives the exit code of a narrange process, `None` if it was terminated by a signal.
pub type ExitHandler = Arc<dyn Fn(Option<i32>) + Send + Sync>;

/// Sink for the messages produced by the default handlers. Operations that are not
/// implemented are silently dropped.
pub trait Writer: Send + Sync {
    fn log(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Default writer printing to stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Writer for Console {
    fn log(&self, msg: &str) {
        println!("{}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", msg);
    }
}

/// Caller options for a single narrange invocation. No field is required, unset paths
/// and switches fall back to [`crate::Defaults`].
#[derive(Clone, Default)]
pub struct Options {
    pub src_path: Option<path::PathBuf>,
    pub config_file_path: Option<path::PathBuf>,
    /// Alias for `config_file_path`, which takes precedence
    pub config_path: Option<path::PathBuf>,
    pub exe_path: Option<path::PathBuf>,
    /// Tab width selecting a bundled configuration file if the configuration is missing
    pub tabs: Option<u8>,

    pub on_error: Option<OutputCallback>,
    pub on_out: Option<OutputCallback>,
    pub on_exit_error: Option<ExitCallback>,
    pub on_exit_success: Option<ExitCallback>,
    pub done: Option<DoneCallback>,

    pub silent: Option<Silent>,
    pub writer: Option<Arc<dyn Writer>>,
    pub debug_on: bool,

    pub main_handler: Option<MainHandler>,
    pub exit_handler: Option<ExitHandler>,
    pub factories: Option<Arc<dyn Factories>>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn src_path<P: Into<path::PathBuf>>(mut self, path: P) -> Options {
        self.src_path = Some(path.into());
        self
    }

    pub fn config_file_path<P: Into<path::PathBuf>>(mut self, path: P) -> Options {
        self.config_file_path = Some(path.into());
        self
    }

    pub fn exe_path<P: Into<path::PathBuf>>(mut self, path: P) -> Options {
        self.exe_path = Some(path.into());
        self
    }

    pub fn tabs(mut self, tabs: u8) -> Options {
        self.tabs = Some(tabs);
        self
    }

    pub fn silent(mut self, silent: Silent) -> Options {
        self.silent = Some(silent);
        self
    }

    pub fn writer<W: Writer + 'static>(mut self, writer: W) -> Options {
        self.writer = Some(Arc::new(writer));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Options
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_out<F>(mut self, f: F) -> Options
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_out = Some(Arc::new(f));
        self
    }

    pub fn on_exit_error<F>(mut self, f: F) -> Options
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_exit_error = Some(Arc::new(f));
        self
    }

    pub fn on_exit_success<F>(mut self, f: F) -> Options
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_exit_success = Some(Arc::new(f));
        self
    }

    pub fn done<F>(mut self, f: F) -> Options
    where
        F: Fn(Option<i32>) + Send + Sync + 'static,
    {
        self.done = Some(Arc::new(f));
        self
    }

    pub fn factories<F: Factories + 'static>(mut self, factories: F) -> Options {
        self.factories = Some(Arc::new(factories));
        self
    }
}
