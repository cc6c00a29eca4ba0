use std::{fmt, sync::Arc};

#[allow(unused_imports)]
use color_eyre::{eyre::eyre, eyre::WrapErr, Help};

use run_narrange::{create, Defaults, Options, Writer};

use crate::cli;

fn log_pretty() -> bool {
    // the spinner is only shown for log level "info". when debugging the spinner would
    // interfere with the log output, if info is not enabled at all ("quiet") nothing is shown
    !log::log_enabled!(log::Level::Debug) && log::log_enabled!(log::Level::Info)
}

struct LogStep(u8);

impl LogStep {
    fn new() -> LogStep {
        LogStep(1)
    }

    fn next(&mut self) -> String {
        let str = format!(
            "{}",
            console::style(format!("[ {:1}/3 ]", self.0)).bold().dim()
        );
        self.0 += 1;
        if log_pretty() {
            str
        } else {
            "".to_string()
        }
    }
}

/// Writes the output of narrange without garbling the spinner.
struct ProgressWriter {
    pb: indicatif::ProgressBar,
}

impl ProgressWriter {
    fn trimmed(msg: &str) -> Option<&str> {
        let msg = msg.trim_end_matches(['\r', '\n']);
        (!msg.is_empty()).then_some(msg)
    }
}

impl Writer for ProgressWriter {
    fn log(&self, msg: &str) {
        if let Some(msg) = ProgressWriter::trimmed(msg) {
            self.pb.suspend(|| println!("{}", msg));
        }
    }

    fn error(&self, msg: &str) {
        if let Some(msg) = ProgressWriter::trimmed(msg) {
            self.pb.suspend(|| eprintln!("{}", msg));
        }
    }
}

/// Writer for dry-runs, stdout is reserved for the .json output.
struct DryRunWriter;

impl Writer for DryRunWriter {
    fn log(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", msg);
    }
}

fn pick<T>(key: &str, json: Option<(&T, &str)>, cli: Option<&T>) -> Option<T>
where
    T: Clone + fmt::Debug,
{
    match (json, cli) {
        (None, None) => None,
        (Some((value, _)), None) => Some(value.clone()),
        (None, Some(value)) => Some(value.clone()),
        (Some((value_json, name)), Some(value_cli)) => {
            log::debug!(
                "Override detected:\n{} {:?} specified in '{}' \
                    is overridden by the command line parameter: {:?}\n",
                key,
                value_json,
                name,
                value_cli
            );
            Some(value_cli.clone())
        }
    }
}

fn from_json<'a, T, F>(json: Option<&'a cli::JsonModel>, field: F) -> Option<(&'a T, &'a str)>
where
    F: Fn(&'a cli::JsonModel) -> Option<&'a T>,
{
    json.and_then(|json| field(json).map(|value| (value, json.name.as_str())))
}

fn options(data: &cli::Data, defaults: &Defaults) -> Options {
    let json = data.json.as_ref();

    let mut opts = Options::new();
    opts.src_path = pick(
        "Sources",
        from_json(json, |j| j.src_path.as_ref()),
        data.src.as_ref(),
    );
    opts.exe_path = pick(
        "Command",
        from_json(json, |j| j.exe_path.as_ref()),
        data.exe.as_ref(),
    );
    opts.config_file_path = pick(
        "Configuration",
        from_json(json, |j| j.config_file_path.as_ref()),
        data.config.as_ref(),
    );
    opts.config_path = json.and_then(|j| j.config_path.clone());
    opts.tabs = pick("Tabs", from_json(json, |j| j.tabs.as_ref()), data.tabs.as_ref());

    // switches only ever add to the silent set of the environment
    let silent = json
        .and_then(|j| j.silent)
        .unwrap_or_default()
        .union(data.silent)
        .union(defaults.silent);
    opts.silent = Some(silent);
    opts.debug_on = data.debug || json.map(|j| j.debug_on).unwrap_or(false);
    opts
}

pub fn run(data: cli::Data, defaults: Defaults) -> eyre::Result<i32> {
    let start = std::time::Instant::now();
    let defaults = match &data.root {
        None => defaults,
        Some(root) => defaults.with_root(root),
    };

    log::info!(" ");
    let mut step = LogStep::new();

    let pb = if log_pretty() && !data.dry_run {
        indicatif::ProgressBar::new_spinner()
    } else {
        indicatif::ProgressBar::hidden()
    };

    let mut opts = options(&data, &defaults);
    let writer: Arc<dyn Writer> = if data.dry_run {
        Arc::new(DryRunWriter)
    } else {
        Arc::new(ProgressWriter { pb: pb.clone() })
    };
    opts.writer = Some(writer);

    let narrange = create(opts, &defaults);
    let context = narrange.context();

    if context.paths.config_file_path.as_os_str().is_empty() {
        log::info!(
            "{} No configuration found, using the narrange defaults",
            step.next()
        );
    } else {
        log::info!(
            "{} Using configuration {}",
            step.next(),
            console::style(context.paths.config_file_path.to_string_lossy()).bold(),
        );
    }

    if data.dry_run {
        let json = serde_json::to_string_pretty(context)
            .wrap_err("Failed to serialize the narrange command")?;
        println!("{}", json);
        return Ok(0);
    }

    log::info!(
        "{} Executing {} ...\n",
        step.next(),
        console::style(&context.command).bold()
    );

    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message("Running narrange");

    let process = narrange.run();
    let code = process.wait();
    pb.finish_and_clear();

    let duration = start.elapsed();
    if log_pretty() {
        let style = match code {
            Some(0) => console::Style::new().green().bold(),
            _ => console::Style::new().red().bold(),
        };
        println!(
            "{:>12} in {}",
            style.apply_to("Finished"),
            indicatif::HumanDuration(duration)
        );
    } else {
        log::info!("{} Finished in {:#?}", step.next(), duration);
    }

    log::info!(" "); // just an empty newline
    Ok(code.unwrap_or(1))
}
