use failure::Error;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[macro_use]
mod ui;

mod args;
mod commands;

use crate::{
    args::{Args, Command, GlobalArgs},
};


/// We just catch potential errors here and pretty print them. The actual
/// useful code is in `run()`.
fn main() {
    if let Err(e) = run() {
        error!("An error occured: {}", e);

        for cause in e.iter_causes() {
            error!("  ... caused by: {}", cause);
        }

        if std::env::var("RUST_BACKTRACE") == Ok("1".to_string()) {
            error!();
            error!("{}", e.backtrace());
        }

        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let args = Args::from_args();
    let global_args = &args.global;
    init_logging(global_args);

    match &args.command {
        Command::Info { args } => {
            commands::info::run(global_args, args)?;
        }
        Command::Convert { args } => {
            commands::convert::run(global_args, args)?;
        }
    }

    Ok(())
}

/// Log messages of the library go to stderr. `RUST_LOG` takes precedence
/// over `--verbose`.
fn init_logging(global_args: &GlobalArgs) {
    let default = if global_args.verbose { "plydoc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
