// src/main.rs

use opsched::{cli, logging, run};

fn main() {
    if let Err(err) = run_main() {
        eprintln!("opsched error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log.as_deref())?;
    run(args)
}
