#![forbid(unsafe_code)]
//! GEMTools command line driver

use std::io::{self, Write};

use console::style;

use gemtools::dispatch::requested_log_level;
use gemtools::{interrupt, logging, Config, Dispatcher, ExecContext, LocalEngine};

fn main() -> anyhow::Result<()> {
    let (config, config_error) = Config::load_or_default();
    if !config.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    if let Some(e) = config_error {
        eprintln!(
            "{} Ignoring {}: {}",
            style("!").yellow(),
            gemtools::config::CONFIG_FILE,
            e
        );
    }

    let argv: Vec<String> = std::env::args().collect();
    logging::init(requested_log_level(&argv).unwrap_or(config.log_level));

    interrupt::install()?;

    let engine = LocalEngine::new().with_strategy(config.execution);
    let dispatcher = Dispatcher::with_builtins(engine)?.with_default_log_level(config.log_level);

    let mut stdout = io::stdout();
    let code = dispatcher.run(&argv, ExecContext::from_env(), &mut stdout, &mut io::stderr())?;
    stdout.flush()?;
    std::process::exit(code);
}
