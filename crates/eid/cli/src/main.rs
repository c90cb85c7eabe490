use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eid_apdu_transport_pcsc::PcscDeviceManager;
use eid_card::CertificateKind;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

mod commands;
mod config;
mod utils;

use commands::*;
use utils::{reader, session::SessionOptions};

#[derive(Parser)]
#[command(version, about = "Read and sign with Belgian eID cards")]
struct Cli {
    /// Optional reader name to use (will auto-detect if not specified)
    #[arg(short, long)]
    reader: Option<String>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to ~/.eid/eid.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accept any card, not only BeID cards
    #[arg(long)]
    any_card: bool,

    /// Refuse to sign unless the PIN is entered on a pinpad reader
    #[arg(long)]
    secure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available readers
    List,

    /// Show the cardholder identity
    Identity,

    /// Show the cardholder address
    Address,

    /// Save the cardholder photo
    Photo {
        /// Output JPEG file
        #[arg(short, long, default_value = "photo.jpg")]
        output: PathBuf,
    },

    /// Export certificates as DER files
    Certificates {
        /// Certificate to export (all when omitted)
        #[arg(value_enum)]
        kind: Option<CertificateKind>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Verify the PIN
    VerifyPin {
        /// PIN code (prompted for when the reader has no pinpad)
        #[arg(long)]
        pin: Option<String>,
    },

    /// Sign a file
    Sign(SignArgs),
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;
    let options = SessionOptions {
        reader: cli.reader.as_deref(),
        any_card: cli.any_card,
        secure: cli.secure,
        config: &config,
    };

    let manager = PcscDeviceManager::new()?;
    if let Commands::List = cli.command {
        return reader::list_readers(&manager, &options.profile());
    }

    let mut card = utils::session::open_card(&manager, &options)?;
    match &cli.command {
        Commands::List => unreachable!(),
        Commands::Sign(args) => return sign_command(card, args),
        Commands::Identity => identity_command(&mut card)?,
        Commands::Address => address_command(&mut card)?,
        Commands::Photo { output } => photo_command(&mut card, output)?,
        Commands::Certificates { kind, dir } => certificates_command(&mut card, *kind, dir)?,
        Commands::VerifyPin { pin } => verify_pin_command(&mut card, pin.as_deref())?,
    }

    card.disconnect()?;
    Ok(())
}

fn setup_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &directives))
        .with_ansi(true)
        .init();
}

/// `RUST_LOG` style directives over a default of INFO, or DEBUG when verbose
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}
