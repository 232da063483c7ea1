use anyhow::Result;
use clap::Parser;
use pkgsieve::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run()
}

/// Install the global subscriber. Log records go to stderr so stdout stays
/// reserved for the filtered manifest stream.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "pkgsieve=debug"
    } else {
        "pkgsieve=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
