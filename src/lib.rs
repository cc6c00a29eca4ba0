//! Executes the [narrange](http://www.narrange.net/) code formatter with resolved source,
//! executable and configuration paths.
//!
//! ```no_run
//! use run_narrange::{create, Defaults, Options};
//!
//! let defaults = Defaults::from_env();
//! let narrange = create(Options::new().src_path("project").tabs(4), &defaults);
//!
//! let process = narrange.run();
//! let code = process.wait();
//! assert_eq!(Some(0), code);
//! ```

pub mod cmd;
pub mod command;
pub mod defaults;
pub mod handlers;
mod narrange;
mod options;
pub mod resolve;

pub use cmd::Process;
pub use defaults::{Defaults, Silent};
pub use handlers::Writers;
pub use narrange::{create, Builtin, Context, Factories, NArrange};
pub use options::{
    Console, DoneCallback, ExitCallback, ExitHandler, MainHandler, Options, OutputCallback,
    Writer,
};
