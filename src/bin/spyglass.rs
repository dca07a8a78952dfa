use clap::Parser;
use tracing::Level;

use spyglass::{IdentifyError, IpIdentifyArgs, IpIdentifyFilter, RdapLens, SpyglassConfig};

/// Identify an IP Address: registrant and protocol version via RDAP
#[derive(Parser)]
#[clap(about, long_about = None)]
struct Cli {
    /// IP Address to Identify
    #[clap(name = "IP")]
    ip_string: String,

    /// Print the registrant of the IP address to STDOUT
    #[clap(short, long)]
    registrant: bool,

    /// Print the IP protocol version number to STDOUT
    #[clap(short, long, conflicts_with = "registrant")]
    version: bool,

    /// configuration file path, by default $HOME/.spyglass/spyglass.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let filter = if cli.registrant {
        IpIdentifyFilter::Registrant
    } else if cli.version {
        IpIdentifyFilter::Version
    } else {
        IpIdentifyFilter::All
    };

    let lens = match SpyglassConfig::new(&cli.config) {
        Ok(config) => RdapLens::with_config(&config),
        Err(e) => {
            eprintln!("WARN: unable to load configuration, using defaults: {e}");
            RdapLens::new()
        }
    };

    let args = IpIdentifyArgs::new(cli.ip_string).with_filter(filter);
    match lens.identify(&args) {
        Ok(identity) => {
            println!("{}", lens.format_result(&identity, &args.filter));
        }
        Err(e @ IdentifyError::InvalidAddress(_)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e @ IdentifyError::Http { .. }) => {
            eprintln!("RDAP lookup failed: {e}");
            std::process::exit(2);
        }
    }
}
