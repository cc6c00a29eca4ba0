use std::path;

use serde::Deserialize;
use schemars::JsonSchema;

pub const ENV_SILENT_OUT: &str = "NARRANGE_SILENT_OUT";
pub const ENV_SILENT_ERR: &str = "NARRANGE_SILENT_ERR";
pub const ENV_SILENT_EXIT: &str = "NARRANGE_SILENT_EXIT";
pub const ENV_CONFIG_PATH: &str = "NARRANGE_CONFIG_PATH";
pub const ENV_SRC_PATH: &str = "NARRANGE_SRC_PATH";
pub const ENV_EXE_PATH: &str = "NARRANGE_EXE_PATH";
pub const ENV_ROOT: &str = "NARRANGE_ROOT";

const DEFAULT_CONFIG_FILE: &str = "config/narrange.xml";
const DEFAULT_SRC: &str = "src";

/// Switches for suppressing stdout, stderr and exit status reporting.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Silent {
    /// Suppress the output of narrange
    pub out: bool,
    /// Suppress the error output of narrange
    pub err: bool,
    /// Suppress the success/error message on exit
    pub exit: bool,
}

impl Silent {
    pub fn union(self, other: Silent) -> Silent {
        Silent {
            out: self.out || other.out,
            err: self.err || other.err,
            exit: self.exit || other.exit,
        }
    }
}

/// Deployment defaults, read once at start-up and passed explicitly to the resolver and
/// the handler builders.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub silent: Silent,
    pub config_file_path: path::PathBuf,
    pub src_path: path::PathBuf,
    /// Explicit executable, `None` selects the executable bundled in `root`
    pub exe_path: Option<path::PathBuf>,
    /// Root of the bundled resources, i.e., `lib/narrange.exe` and the `config` directory
    pub root: path::PathBuf,
}

fn flag(value: Option<String>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
    }
}

impl Defaults {
    pub fn from_env() -> Defaults {
        Defaults::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Defaults
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty variables are treated as not set
        let value = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let root = value(ENV_ROOT)
            .map(path::PathBuf::from)
            .unwrap_or_else(|| path::PathBuf::from(env!("CARGO_MANIFEST_DIR")));

        let defaults = Defaults {
            silent: Silent {
                out: flag(value(ENV_SILENT_OUT)),
                err: flag(value(ENV_SILENT_ERR)),
                exit: flag(value(ENV_SILENT_EXIT)),
            },
            config_file_path: value(ENV_CONFIG_PATH)
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
                .into(),
            src_path: value(ENV_SRC_PATH)
                .unwrap_or_else(|| DEFAULT_SRC.to_string())
                .into(),
            exe_path: value(ENV_EXE_PATH).map(path::PathBuf::from),
            root,
        };

        log::trace!("defaults {:?}", defaults);
        defaults
    }

    pub fn with_root<P>(self, root: P) -> Defaults
    where
        P: AsRef<path::Path>,
    {
        Defaults {
            root: path::PathBuf::from(root.as_ref()),
            ..self
        }
    }

    pub fn exe_path(&self) -> path::PathBuf {
        match &self.exe_path {
            Some(exe) => path::PathBuf::from(exe.as_path()),
            None => self.root.join("lib").join("narrange.exe"),
        }
    }

    /// Directory containing the bundled narrange configuration files.
    pub fn config_dir(&self) -> path::PathBuf {
        self.root.join("config")
    }
}
