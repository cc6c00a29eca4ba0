use std::{fmt, path};

use serde::Serialize;

use crate::command;
use crate::handlers::{self, Writers};
use crate::options::{ExitHandler, MainHandler, Options};
use crate::resolve::{self, ResolvedPaths};
use crate::defaults::Defaults;
use crate::cmd;

/// Construction strategies used by [`create`]. Every method defaults to the built-in
/// implementation, implementors override what they need.
pub trait Factories: Send + Sync {
    fn create_command(&self, exe: &path::Path, src: &path::Path, flag: &str) -> String {
        command::build_command(exe, src, flag)
    }

    fn create_writers(&self, opts: &Options, defaults: &Defaults) -> Writers {
        handlers::build_writers(opts, defaults)
    }

    fn create_main_handler(&self, opts: &Options, writers: Writers) -> MainHandler {
        handlers::build_main_handler(opts, writers)
    }

    fn create_exit_handler(&self, opts: &Options, writers: Writers) -> ExitHandler {
        handlers::build_exit_handler(opts, writers)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Builtin;

impl Factories for Builtin {}

/// Snapshot of everything needed to execute narrange.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(flatten)]
    pub paths: ResolvedPaths,
    pub command: String,
    #[serde(skip)]
    pub main_handler: MainHandler,
    #[serde(skip)]
    pub exit_handler: ExitHandler,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("paths", &self.paths)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct NArrange {
    context: Context,
}

impl NArrange {
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Spawns narrange, the handlers of the context are called once the process exited.
    pub fn run(&self) -> cmd::Process {
        let main_handler = self.context.main_handler.clone();
        let exit_handler = self.context.exit_handler.clone();

        cmd::Runner::new(self.context.command.as_str()).spawn(
            move |err, stdout, stderr| main_handler(err, stdout, stderr),
            move |code| exit_handler(code),
        )
    }
}

pub fn create(opts: Options, defaults: &Defaults) -> NArrange {
    let factories: &dyn Factories = match &opts.factories {
        Some(factories) => factories.as_ref(),
        None => &Builtin,
    };

    let paths = resolve::paths(&opts, defaults);
    let flag = command::config_flag(&paths.config_file_path);
    let command = factories.create_command(&paths.exe_path, &paths.src_path, &flag);

    let writers = factories.create_writers(&opts, defaults);
    let main_handler = match &opts.main_handler {
        Some(handler) => handler.clone(),
        None => factories.create_main_handler(&opts, writers.clone()),
    };
    let exit_handler = match &opts.exit_handler {
        Some(handler) => handler.clone(),
        None => factories.create_exit_handler(&opts, writers.clone()),
    };

    writers.debug(&format!("narrange command '{}'", command));
    writers.debug(&format!("narrange paths {:?}", paths));

    NArrange {
        context: Context {
            paths,
            command,
            main_handler,
            exit_handler,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::Recorder;
    use std::sync::{Arc, Mutex};

    fn defaults() -> Defaults {
        Defaults::from_lookup(|_| None)
    }

    #[test]
    fn test_missing_config_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Options::new()
            .src_path("proj")
            .config_file_path(dir.path().join("missing.xml"))
            .exe_path("tool");

        let narrange = create(opts, &defaults());
        assert_eq!("tool proj ", narrange.context().command);
        assert_eq!(path::PathBuf::new(), narrange.context().paths.config_file_path);
    }

    #[test]
    fn test_context_json() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("narrange.xml");
        std::fs::write(&cfg, "<x/>").unwrap();

        let opts = Options::new()
            .src_path("proj")
            .config_file_path(&cfg)
            .exe_path("tool");
        let narrange = create(opts, &defaults());

        let json = serde_json::to_value(narrange.context()).unwrap();
        assert_eq!("tool", json["exePath"]);
        assert_eq!("proj", json["srcPath"]);
        assert_eq!(cfg.to_str().unwrap(), json["configFilePath"]);
        assert_eq!(
            format!("tool proj /c:{}", cfg.to_string_lossy()).as_str(),
            json["command"]
        );
    }

    struct Quoted;

    impl Factories for Quoted {
        fn create_command(&self, exe: &path::Path, src: &path::Path, flag: &str) -> String {
            format!("\"{}\" \"{}\" {}", exe.display(), src.display(), flag)
        }
    }

    #[test]
    fn test_factories() {
        let opts = Options::new()
            .src_path("my src")
            .config_file_path("/does/not/exist.xml")
            .exe_path("tool")
            .factories(Quoted);

        let narrange = create(opts, &defaults());
        assert_eq!("\"tool\" \"my src\" ", narrange.context().command);
    }

    #[test]
    fn test_handler_overrides() {
        let codes = Arc::new(Mutex::new(vec![]));
        let c = Arc::clone(&codes);

        let mut opts = Options::new().writer(Recorder::default());
        opts.exit_handler = Some(Arc::new(move |code: Option<i32>| {
            c.lock().unwrap().push(code)
        }));

        let narrange = create(opts, &defaults());
        (narrange.context().exit_handler)(Some(4));
        assert_eq!(vec![Some(4)], *codes.lock().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_run() {
        let rec = Recorder::default();
        let codes = Arc::new(Mutex::new(vec![]));
        let c = Arc::clone(&codes);

        // `echo` stands in for narrange and prints its arguments
        let opts = Options::new()
            .exe_path("echo")
            .src_path("proj")
            .config_file_path("/does/not/exist.xml")
            .writer(rec.clone())
            .done(move |code| c.lock().unwrap().push(code));

        let narrange = create(opts, &defaults());
        let process = narrange.run();
        assert_eq!(Some(0), process.wait());

        assert_eq!(
            vec!["log:proj\n".to_string(), format!("log:{}", handlers::MSG_EXIT_SUCCESS)],
            rec.lines()
        );
        assert_eq!(vec![Some(0)], *codes.lock().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_failure() {
        let rec = Recorder::default();
        let opts = Options::new()
            .exe_path("ls")
            .src_path("/does/not/exist")
            .config_file_path("/does/not/exist.xml")
            .writer(rec.clone());

        let process = create(opts, &defaults()).run();
        let code = process.wait();
        assert!(matches!(code, Some(c) if c != 0));

        let lines = rec.lines();
        assert_eq!(3, lines.len());
        assert!(lines[0].starts_with("error:"));
        assert_eq!("log:", lines[1]);
        assert_eq!(format!("error:{}", handlers::MSG_EXIT_ERROR), lines[2]);
    }
}
