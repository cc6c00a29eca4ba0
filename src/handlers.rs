use std::{io, sync::Arc};

use crate::defaults::{Defaults, Silent};
use crate::options::{Console, ExitHandler, MainHandler, Options, Writer};

pub const MSG_EXIT_ERROR: &str = "narrange error";
pub const MSG_EXIT_SUCCESS: &str = "narrange success";

/// Output channels of the default handlers, each gated by its own switch.
#[derive(Clone)]
pub struct Writers {
    silent: Silent,
    debug_on: bool,
    writer: Arc<dyn Writer>,
}

impl Writers {
    pub fn info(&self, msg: &str) {
        if !self.silent.out {
            self.writer.log(msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if !self.silent.err {
            self.writer.error(msg);
        }
    }

    pub fn debug(&self, msg: &str) {
        log::debug!("{}", msg);
        if self.debug_on {
            self.writer.log(msg);
        }
    }
}

pub fn build_writers(opts: &Options, defaults: &Defaults) -> Writers {
    Writers {
        silent: opts.silent.unwrap_or(defaults.silent),
        debug_on: opts.debug_on,
        writer: match &opts.writer {
            Some(writer) => Arc::clone(writer),
            None => Arc::new(Console),
        },
    }
}

pub fn build_main_handler(opts: &Options, writers: Writers) -> MainHandler {
    let on_error = opts.on_error.clone();
    let on_out = opts.on_out.clone();

    Arc::new(move |err: Option<&io::Error>, stdout: &str, stderr: &str| {
        if let Some(err) = err {
            writers.debug(&format!("narrange failed: {}", err));
            match &on_error {
                Some(on_error) => on_error(stderr),
                None => writers.error(stderr),
            }
        }
        // stdout is reported independently of the error
        match &on_out {
            Some(on_out) => on_out(stdout),
            None => writers.info(stdout),
        }
    })
}

pub fn build_exit_handler(opts: &Options, writers: Writers) -> ExitHandler {
    let on_exit_error = opts.on_exit_error.clone();
    let on_exit_success = opts.on_exit_success.clone();
    let done = opts.done.clone();
    let silent_exit = writers.silent.exit;

    Arc::new(move |code: Option<i32>| {
        // `done` must run exactly once, also if one of the callbacks panics
        let _done = scopeguard::guard(code, |code| {
            if let Some(done) = &done {
                done(code)
            }
        });

        writers.debug(&format!("narrange exited with code {:?}", code));
        if silent_exit {
            return;
        }

        match code {
            Some(0) => match &on_exit_success {
                Some(on_exit_success) => on_exit_success(),
                None => writers.info(MSG_EXIT_SUCCESS),
            },
            _ => match &on_exit_error {
                Some(on_exit_error) => on_exit_error(),
                None => writers.error(MSG_EXIT_ERROR),
            },
        }
    })
}
