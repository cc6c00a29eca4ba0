mod logging;
pub mod run;
pub mod utils;

use std::path;
use std::process;

use clap::{arg, crate_authors, crate_description, crate_name, crate_version, value_parser};
#[allow(unused_imports)]
use color_eyre::{eyre::eyre, eyre::WrapErr, Help};

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use run_narrange::Silent;

#[derive(Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JsonModel {
    /// Path to the sources to format (can be specified as <SRC>)
    pub src_path: Option<path::PathBuf>,
    /// Path to the narrange configuration file (can be specified via --config)
    pub config_file_path: Option<path::PathBuf>,
    /// Alias for `configFilePath`
    pub config_path: Option<path::PathBuf>,
    /// Optional path to the narrange executable or command name (can be specified via --exe)
    pub exe_path: Option<path::PathBuf>,
    /// Tab width selecting a bundled configuration if the configuration file does not exist
    pub tabs: Option<u8>,
    /// Suppress the output, error output or exit message of narrange
    pub silent: Option<Silent>,
    /// Print the resolved command and paths
    #[serde(default)]
    pub debug_on: bool,

    #[serde(skip)]
    pub root: path::PathBuf,
    #[serde(skip)]
    pub name: String,
}

#[derive(Debug)]
pub struct Data {
    pub json: Option<JsonModel>,
    pub src: Option<path::PathBuf>,
    pub config: Option<path::PathBuf>,
    pub exe: Option<path::PathBuf>,
    pub tabs: Option<u8>,
    pub root: Option<path::PathBuf>,
    pub silent: Silent,
    pub debug: bool,
    pub dry_run: bool,
}

pub struct Builder {
    pub matches: clap::ArgMatches,
}

impl Builder {
    fn app() -> clap::Command {
        clap::Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
            .arg(
                arg!([SRC] "Path to the sources to format. Overrides <JSON> configuration, defaults to `src`")
                    .value_parser(value_parser!(path::PathBuf)),
            )
            .arg(
                arg!(-o --options <JSON> "Optional path to a .json file with options")
                    .value_parser(value_parser!(path::PathBuf))
                    .required(false),
            )
            .arg(
                arg!(-c --config <FILE> "Optional path to the narrange configuration file. Overrides <JSON> configuration")
                    .value_parser(value_parser!(path::PathBuf))
                    .required(false),
            )
            .arg(
                arg!(-e --exe <EXE> "Optional path to the narrange executable or command. Overrides <JSON> configuration")
                    .value_parser(value_parser!(path::PathBuf))
                    .required(false),
            )
            .arg(
                arg!(-t --tabs <N> "Tab width of the bundled configuration used if the configuration file does not exist")
                    .value_parser(value_parser!(u8))
                    .required(false),
            )
            .arg(
                arg!(-r --root <DIR> "Optional root folder of the bundled narrange executable and configurations")
                    .value_parser(value_parser!(path::PathBuf))
                    .required(false),
            )
            .arg(arg!(--"silent-out" "Suppress the output of narrange"))
            .arg(arg!(--"silent-err" "Suppress the error output of narrange"))
            .arg(arg!(--"silent-exit" "Suppress the success or error message on exit"))
            .arg(arg!(-d --debug "Print the resolved command and paths"))
            .arg(arg!(-n --"dry-run" "Print the resolved command and paths as .json without executing narrange"))
            .arg(
                arg!(-v --verbose ... "Verbosity, use -vv... for verbose output.")
                    .global(true),
            )
            .arg(arg!(-q --quiet "Suppress all output except for errors; overrides -v"))
            .subcommand(
                clap::Command::new("schema")
                    .about("Print the schema used for the <JSON> options file"),
            )
    }

    pub fn build() -> Builder {
        let cmd = Builder::app();
        let builder = Builder {
            matches: cmd.get_matches(),
        };
        logging::setup(&builder.matches);
        builder
    }

    pub fn parse(self) -> eyre::Result<Data> {
        if self.matches.subcommand_matches("schema").is_some() {
            println!("{}", JsonModel::schema(),);
            process::exit(0);
        }

        let json = match self.path_for_key("options") {
            None => None,
            Some(path) => Some(JsonModel::load(path).wrap_err("Invalid parameter --options")?),
        };

        let root = match self.path_for_key("root") {
            None => None,
            Some(path) => Some(
                utils::dir_or_err(path)
                    .wrap_err("Invalid parameter --root")
                    .suggestion(
                        "Please make sure that --root is a directory containing \
                            the 'config' folder with the narrange configuration files",
                    )?,
            ),
        };

        // neither the sources, the configuration nor the command are validated here, narrange
        // reports invalid sources and missing configurations are replaced by the resolver
        Ok(Data {
            json,
            src: self.path_for_key("SRC"),
            config: self.path_for_key("config"),
            exe: self.path_for_key("exe"),
            tabs: self.matches.get_one::<u8>("tabs").copied(),
            root,
            silent: Silent {
                out: self.matches.get_flag("silent-out"),
                err: self.matches.get_flag("silent-err"),
                exit: self.matches.get_flag("silent-exit"),
            },
            debug: self.matches.get_flag("debug"),
            dry_run: self.matches.get_flag("dry-run"),
        })
    }

    fn path_for_key(&self, key: &str) -> Option<path::PathBuf> {
        self.matches.get_one::<path::PathBuf>(key).cloned()
    }
}

/// Joins relative paths from the .json file with its root folder. Plain command names
/// (e.g. `narrange`) are kept as they are since they are looked up in the `$PATH`.
fn rebase(root: &path::Path, path: Option<path::PathBuf>, is_command: bool) -> Option<path::PathBuf> {
    path.map(|path| {
        if path.is_absolute() || (is_command && path.components().count() == 1) {
            path
        } else {
            root.join(path)
        }
    })
}

impl JsonModel {
    fn schema() -> String {
        let schema = schema_for!(JsonModel);
        serde_json::to_string_pretty(&schema).unwrap()
    }

    fn load<P>(path: P) -> eyre::Result<JsonModel>
    where
        P: AsRef<path::Path>,
    {
        let json_path = utils::file_with_ext(path.as_ref(), "json", true)?;
        let json_name = json_path.to_string_lossy();

        let f = std::fs::File::open(path.as_ref())
            .wrap_err(format!("Failed to open provided JSON file '{}'", json_name))?;

        let mut json: JsonModel = serde_json::from_reader(std::io::BufReader::new(f))
            .wrap_err(format!("Validation failed for '{}'", json_name))
            .suggestion(format!(
        "Please make sure that '{}' is a valid .json file and the contents match the required schema.",
        json_name))?;

        let root = json_path
            .canonicalize()
            .wrap_err(format!("Failed to resolve the folder of '{}'", json_name))?
            .parent()
            .map(path::PathBuf::from)
            .ok_or_else(|| eyre!("'{}' has no parent folder", json_name))?;

        json.src_path = rebase(&root, json.src_path.take(), false);
        json.config_file_path = rebase(&root, json.config_file_path.take(), false);
        json.config_path = rebase(&root, json.config_path.take(), false);
        json.exe_path = rebase(&root, json.exe_path.take(), true);

        json.root = root;
        json.name = json_path.to_string_lossy().into();
        Ok(json)
    }
}
