mod cli;

use run_narrange::Defaults;

fn main() -> eyre::Result<()> {
    let data = cli::Builder::build().parse()?;

    // the environment is read exactly once (after the logger is set up), all defaults are
    // passed on explicitly
    let defaults = Defaults::from_env();
    let code = cli::run::run(data, defaults)?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
