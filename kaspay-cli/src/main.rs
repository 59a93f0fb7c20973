//! Kaspay CLI
//!
//! Command-line client for the Kaspay API: key generation, offline envelope
//! sealing for debugging, and one subcommand per API call.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser, Debug)]
#[command(name = "kaspay")]
#[command(about = "Kaspay API client - authenticated escrow, payment and user calls", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Account, keys and endpoint shared by every API command.
///
/// Endpoint options not given here fall back to `KASPAY_ENV`,
/// `KASPAY_BASE_URL`, `KASPAY_TIMEOUT_SECS`, `KASPAY_CA_CERT` and
/// `KASPAY_INSECURE`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Merchant account identifier
    #[arg(long, env = "KASPAY_UACCOUNT", global = true)]
    pub uaccount: Option<String>,

    /// Encryption key (base64 unless --raw-keys)
    #[arg(long, env = "KASPAY_ENC_KEY", global = true, hide_env_values = true)]
    pub enc_key: Option<String>,

    /// MAC key (base64 unless --raw-keys)
    #[arg(long, env = "KASPAY_MAC_KEY", global = true, hide_env_values = true)]
    pub mac_key: Option<String>,

    /// Treat --enc-key and --mac-key as raw strings instead of base64
    #[arg(long, global = true)]
    pub raw_keys: bool,

    /// Reject keys that are not exactly 32 bytes
    #[arg(long, global = true)]
    pub strict_keys: bool,

    /// API base URL
    #[arg(long, global = true, conflicts_with = "dev")]
    pub base_url: Option<String>,

    /// Use the development server
    #[arg(long, global = true)]
    pub dev: bool,

    /// Disable TLS certificate verification
    #[arg(long, global = true, conflicts_with = "ca_cert")]
    pub insecure: bool,

    /// PEM CA certificate to trust instead of the system roots
    #[arg(long, global = true)]
    pub ca_cert: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a fresh pair of API keys
    Keygen {
        /// Print as shell export statements
        #[arg(long)]
        export: bool,
    },

    /// Seal or open envelopes offline
    Envelope {
        #[command(subcommand)]
        action: EnvelopeAction,
    },

    /// Escrow operations on a transaction
    Escrow {
        #[command(subcommand)]
        action: EscrowAction,
    },

    /// Payment attempts
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },

    /// Link and unlink Kaspay users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
enum EnvelopeAction {
    /// Encrypt and sign a plaintext body
    Seal {
        /// HTTP verb (GET, POST, PUT, DELETE)
        verb: String,

        /// Full request URL
        url: String,

        /// Plaintext body
        #[arg(default_value = "[]")]
        data: String,

        /// UNIX timestamp (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Verify and decrypt a base64 envelope
    Open {
        /// HTTP verb (GET, POST, PUT, DELETE)
        verb: String,

        /// Full request URL
        url: String,

        /// UNIX timestamp the envelope was sealed with
        timestamp: i64,

        /// Base64 envelope
        data: String,
    },
}

#[derive(Subcommand, Debug)]
enum EscrowAction {
    /// Put a transaction on hold
    Hold { trxid: String },

    /// Release held funds
    Release { trxid: String },

    /// Refund held funds
    Refund { trxid: String },

    /// Show the escrow state of a transaction
    Status { trxid: String },
}

#[derive(Subcommand, Debug)]
enum PaymentAction {
    /// Create a payment attempt
    Create {
        /// Attempt as JSON, or @path to read it from a file
        attempt: String,
    },

    /// Execute a payment attempt
    Execute { attempt_id: String },

    /// Refund a payment attempt
    Refund { attempt_id: String },

    /// Cancel a payment attempt
    Cancel { attempt_id: String },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    /// Ask a user to link their account to a merchant
    Link {
        /// Merchant account the user links to
        merchant: String,

        /// Redirect target after approval
        #[arg(long)]
        approve_url: String,

        /// Redirect target after rejection
        #[arg(long)]
        reject_url: String,
    },

    /// Remove a user's link to a merchant
    Unlink {
        /// User account
        uaccount: String,

        /// Merchant account
        merchant: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("kaspay_cli=debug,kaspay_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("kaspay_cli=info,kaspay_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let conn = &cli.connection;

    // Dispatch commands
    let outcome = match cli.command {
        Commands::Keygen { export } => commands::keygen::run(export),
        Commands::Envelope { action } => match action {
            EnvelopeAction::Seal {
                verb,
                url,
                data,
                timestamp,
            } => commands::envelope::seal(conn, &verb, &url, &data, timestamp),
            EnvelopeAction::Open {
                verb,
                url,
                timestamp,
                data,
            } => commands::envelope::open(conn, &verb, &url, timestamp, &data),
        },
        Commands::Escrow { action } => match action {
            EscrowAction::Hold { trxid } => commands::escrow::hold(conn, &trxid).await,
            EscrowAction::Release { trxid } => commands::escrow::release(conn, &trxid).await,
            EscrowAction::Refund { trxid } => commands::escrow::refund(conn, &trxid).await,
            EscrowAction::Status { trxid } => commands::escrow::status(conn, &trxid).await,
        },
        Commands::Payment { action } => match action {
            PaymentAction::Create { attempt } => commands::payment::create(conn, &attempt).await,
            PaymentAction::Execute { attempt_id } => {
                commands::payment::execute(conn, &attempt_id).await
            }
            PaymentAction::Refund { attempt_id } => {
                commands::payment::refund(conn, &attempt_id).await
            }
            PaymentAction::Cancel { attempt_id } => {
                commands::payment::cancel(conn, &attempt_id).await
            }
        },
        Commands::User { action } => match action {
            UserAction::Link {
                merchant,
                approve_url,
                reject_url,
            } => commands::user::link(conn, &merchant, &approve_url, &reject_url).await,
            UserAction::Unlink { uaccount, merchant } => {
                commands::user::unlink(conn, &uaccount, &merchant).await
            }
        },
    };

    if let Err(err) = &outcome {
        ui::error(&format!("{:#}", err));
        if let Some(api) = err.downcast_ref::<kaspay_lib::KaspayError>() {
            ui::info(&format!(
                "error code {} (HTTP {})",
                api.code() as i32,
                api.http_status()
            ));
        }
        std::process::exit(1);
    }

    Ok(())
}
