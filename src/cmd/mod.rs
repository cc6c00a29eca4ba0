use std::{
    io::{self, Read},
    process,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[cfg(windows)]
const SHELL: (&str, &[&str]) = ("cmd", &["/D", "/S", "/C"]);
#[cfg(not(windows))]
const SHELL: (&str, &[&str]) = ("/bin/sh", &["-c"]);

/// Executes a single command line using the system shell.
#[derive(Debug, Clone)]
pub struct Runner {
    cmd: String,
    shell: String,
}

/// Live handle of a spawned command. Output and exit status are delivered to the handlers
/// passed to [`Runner::spawn`] from a background thread.
pub struct Process {
    id: Option<u32>,
    child: Option<Arc<Mutex<process::Child>>>,
    worker: thread::JoinHandle<Option<i32>>,
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = vec![];
    if let Some(mut pipe) = pipe {
        if let Err(err) = pipe.read_to_end(&mut buf) {
            log::warn!("Failed to read process output: {}", err);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn lock(child: &Mutex<process::Child>) -> io::Result<std::sync::MutexGuard<'_, process::Child>> {
    child
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "Process handle is poisoned"))
}

fn wait_for(child: &Mutex<process::Child>) -> io::Result<process::ExitStatus> {
    // polling releases the lock in between such that `Process::kill` never blocks
    loop {
        if let Some(status) = lock(child)?.try_wait()? {
            return Ok(status);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl Runner {
    pub fn new<S>(cmd: S) -> Runner
    where
        S: Into<String>,
    {
        Runner {
            cmd: cmd.into(),
            shell: SHELL.0.to_string(),
        }
    }

    pub fn eval_status(status: process::ExitStatus) -> Result<(), io::Error> {
        match status.code() {
            Some(code) if code == 0 => (),
            Some(code) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("Process terminated with code {}", code),
                ));
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "Process terminated by signal",
                ))
            }
        };
        Ok(())
    }

    fn shell(&self) -> process::Command {
        let mut cmd = process::Command::new(&self.shell);
        cmd.args(SHELL.1).arg(&self.cmd);
        cmd
    }

    /// Spawns the command. Once the process finished, `on_output` receives the error (for
    /// spawn failures and unsuccessful exits), stdout and stderr, followed by `on_exit` with
    /// the exit code. `on_exit` is not called if the process could not be spawned.
    pub fn spawn<F, G>(&self, on_output: F, on_exit: G) -> Process
    where
        F: FnOnce(Option<&io::Error>, &str, &str) + Send + 'static,
        G: FnOnce(Option<i32>) + Send + 'static,
    {
        log::debug!("Spawning '{}'", self.cmd);

        let spawned = self
            .shell()
            .stdin(process::Stdio::null())
            .stdout(process::Stdio::piped())
            .stderr(process::Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                let worker = thread::spawn(move || {
                    let stderr = err.to_string();
                    on_output(Some(&err), "", &stderr);
                    None
                });
                return Process {
                    id: None,
                    child: None,
                    worker,
                };
            }
        };

        let id = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let child = Arc::new(Mutex::new(child));
        let shared = Arc::clone(&child);

        let worker = thread::spawn(move || {
            // both pipes are drained concurrently, a full pipe would block the child
            let err_reader = thread::spawn(move || read_pipe(stderr));
            let stdout = read_pipe(stdout);
            let stderr = err_reader.join().unwrap_or_default();

            match wait_for(&shared) {
                Ok(status) => {
                    let code = status.code();
                    let err = Runner::eval_status(status).err();
                    on_output(err.as_ref(), &stdout, &stderr);
                    on_exit(code);
                    code
                }
                Err(err) => {
                    on_output(Some(&err), &stdout, &stderr);
                    None
                }
            }
        });

        Process {
            id: Some(id),
            child: Some(child),
            worker,
        }
    }
}

impl Process {
    /// OS process identifier, `None` if the process could not be spawned.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn kill(&self) -> io::Result<()> {
        match &self.child {
            None => Ok(()),
            Some(child) => lock(child)?.kill(),
        }
    }

    /// Blocks until the process exited and all handlers returned.
    pub fn wait(self) -> Option<i32> {
        self.worker.join().unwrap_or_else(|_| {
            log::error!("A narrange handler panicked");
            None
        })
    }
}
