use dify_stream::cli::{parse_args, run_cli_command, CliCommand, USAGE, VERSION};

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Handle --version before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("dify-stream {}", VERSION);
        std::process::exit(0);
    }

    color_eyre::install()?;
    init_tracing();

    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if command == CliCommand::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(command))
}
