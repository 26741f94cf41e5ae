use anyhow::Result;
use chartseal_cli::commands::{sign::cmd_sign, verify::cmd_verify, version::cmd_version};
use chartseal_cli::config::{Config, ConfigArgs};
use chartseal_cli::error_printer::{print_error, ErrorPrinterConfig};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const BIN_NAME: &str = "chartseal";

/// Sign and verify packaged Helm charts with provenance files.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, author = "chartseal contributors", version)]
struct Cli {
    #[command(flatten)]
    args: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a package and write `<package>.prov`
    Sign,
    /// Verify the signature and checksum of a package
    Verify,
    /// Display version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.args.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err, &ErrorPrinterConfig::default());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sign => cmd_sign(&Config::load(&cli.args)?),
        Commands::Verify => cmd_verify(&Config::load(&cli.args)?),
        Commands::Version => {
            cmd_version(BIN_NAME);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
