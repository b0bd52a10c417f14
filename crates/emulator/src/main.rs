mod engine;
mod script;
mod session;

use crate::script::Script;
use crate::session::Session;
use anyhow::{Context, Error};
use getopts::Options;
use navstack_core::logging::{get_run_id, init_logging, shutdown_logging};
use navstack_core::settings::Settings;
use std::env;
use std::path::PathBuf;

const SETTINGS_PATH: &str = "Settings.toml";

fn main() -> Result<(), Error> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut opts = Options::new();
    opts.optopt("s", "settings", "Settings file (default: Settings.toml)", "PATH");
    opts.optflag("h", "help", "Print this help message");

    let matches = opts
        .parse(&args)
        .context("can't parse command line arguments")?;

    if matches.opt_present("h") {
        print!(
            "{}",
            opts.usage("Usage: navstack-emulator [-s SETTINGS] [SCRIPT]")
        );
        return Ok(());
    }

    let settings_path = matches
        .opt_str("s")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_PATH));
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("can't load settings from {}", settings_path.display()))?;

    init_logging(&settings.logging).context("can't initialize logging")?;
    tracing::info!(run_id = get_run_id(), "emulator started");

    let script = match matches.free.first() {
        Some(path) => Script::load(path).with_context(|| format!("can't load script {}", path))?,
        None => Script::demo()?,
    };

    let mut session = Session::new(&settings.navigator);
    let result = session.run(&script);

    tracing::info!(ok = result.is_ok(), "emulator finished");
    shutdown_logging();

    result
}
