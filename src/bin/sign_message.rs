use anyhow::Context;
use clap::Parser;
use message_verifier::{
    client::{FileStore, HistoryStore, HttpVerificationClient, LocalWallet, SigningClient, WalletProvider},
    init_logging, Config,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sign-message")]
#[command(about = "Sign a message with a local key and verify it against the configured endpoint")]
struct Args {
    /// Message to sign
    message: String,

    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Hex private key; a fresh key is generated when omitted
    #[arg(long)]
    private_key: Option<String>,

    /// Verification endpoint override
    #[arg(long)]
    verify_url: Option<String>,

    /// Print the stored history after signing
    #[arg(long)]
    show_history: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).context("loading configuration")?;
    if let Some(url) = args.verify_url {
        config.client.verify_url = url;
    }
    init_logging(&config.logging.level)?;

    if args.message.is_empty() {
        anyhow::bail!("message must not be empty");
    }

    let wallet = match args.private_key.as_deref() {
        Some(key) => LocalWallet::from_private_key(key)?,
        None => LocalWallet::random(),
    };
    println!("Wallet: {}", wallet.address());

    let history_dir = config.get_history_dir();
    let history = HistoryStore::open(Arc::new(FileStore::new(&history_dir)))
        .with_context(|| format!("opening history in {}", history_dir.display()))?;
    let api = HttpVerificationClient::new(config.get_verify_url().to_string(), config.get_request_timeout())
        .context("building verification client")?;

    let mut client = SigningClient::new(Arc::new(wallet), Arc::new(api), history);
    client.sign(&args.message).await;

    if let Some(error) = client.status().error() {
        anyhow::bail!("{}", error);
    }

    if let Some(result) = client.last_result() {
        println!("Signature valid: {}", if result.is_valid { "Yes" } else { "No" });
        println!("Signed by: {}", result.signer.as_deref().unwrap_or("-"));
    }

    if args.show_history {
        println!("History ({} entries):", client.history().len());
        for entry in client.history() {
            println!(
                "  [{}] {} ({})",
                if entry.is_valid { "valid" } else { "invalid" },
                entry.message,
                entry.signer.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
