//! Command-line interface for xsd2json

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsd2json::locations::Location;
#[cfg(feature = "cli")]
use xsd2json::{ConflictPolicy, ConverterConfig, Xsd2Json};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd2json")]
#[command(author, version, about = "Convert an XML Schema to JSON", long_about = None)]
struct Cli {
    /// Path to the XSD file, or XSD text
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Emit the flattened editor-assist form
    #[arg(short, long)]
    flatten: bool,

    /// Element names declared more than once: first-wins, error, merge
    #[arg(long, value_name = "POLICY", default_value = "first-wins")]
    on_conflict: ConflictPolicy,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("xsd2json=debug"),
        _ => EnvFilter::new("xsd2json=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConverterConfig::new()
        .with_flatten(cli.flatten)
        .with_conflict_policy(cli.on_conflict);
    let json = Xsd2Json::with_config(config).convert(Location::detect(&cli.source))?;

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &json)?;
        tracing::debug!(path = %output_path.display(), "output written");
    } else {
        println!("{}", json);
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
