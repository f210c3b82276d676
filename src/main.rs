use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose { "novelfetch=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

/// First Ctrl-C asks the download loop to stop; a second exits immediately.
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    let installed = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            std::process::exit(novelfetch::cli::EXIT_INTERRUPTED);
        }
    });
    if let Err(e) = installed {
        tracing::warn!("could not install Ctrl-C handler: {}", e);
    }
    flag
}

fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = novelfetch::cli::Args::parse();
    init_tracing(args.verbose);
    let cancel = install_interrupt_handler();
    if let Err(e) = novelfetch::cli::run(&args, cancel) {
        eprintln!("[ERROR] {}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
