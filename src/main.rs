//! Ethereum wallet CLI
//!
//! One-shot subcommands and an interactive shell over the same views.

use clap::{Parser, Subcommand};
use eth_wallet_client::session::FileStorage;
use eth_wallet_client::views::IMPORT_NEW;
use eth_wallet_client::{
    App, ClientConfig, Error, HttpWalletApi, Result, RpcChain, RpcConfig, SessionStore, TxJournal,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "eth-wallet")]
#[command(about = "Terminal Ethereum wallet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and clear the persisted session
    Logout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the wallet screen
    Show {
        /// Wallet address to select instead of the first one
        #[arg(short, long)]
        wallet: Option<String>,
    },

    /// Import a wallet from a raw private key (64 hex characters)
    Import {
        #[arg(short, long)]
        key: String,
    },

    /// Send ether from a saved wallet
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in ETH
        #[arg(long)]
        amount: String,

        /// Sending wallet (defaults to the first saved wallet)
        #[arg(short, long)]
        wallet: Option<String>,
    },

    /// Show current configuration
    Config,

    /// Interactive shell
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the screens
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(
            cli.log_json
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with((!cli.log_json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();

    // Load config
    let config = match &cli.config {
        Some(config_path) => ClientConfig::from_file(config_path)?,
        None => ClientConfig::default(),
    };
    let rpc = RpcConfig::from_env();

    if let Commands::Config = cli.command {
        let value = serde_json::json!({
            "client": config,
            "rpc": {
                "url": rpc.url(),
                "network": format!("{:?}", rpc.network()),
                "chain_id": rpc.network().chain_id(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut app = start_app(&config, rpc).await?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = read_password(password).await?;
            app.login(&email, &password).await;
            println!("{}", app);
            if !app.is_logged_in() {
                return Err(Error::Rejected("Login failed".to_string()));
            }
        }
        Commands::Register { email, password } => {
            let password = read_password(password).await?;
            let registered = app.register(&email, &password).await;
            println!("{}", app);
            if !registered {
                return Err(Error::Rejected("Registration failed".to_string()));
            }
        }
        Commands::Logout { yes } => {
            let Some(view) = app.wallet_mut() else {
                println!("Not logged in");
                return Ok(());
            };
            view.request_logout();
            let confirmed = if yes {
                true
            } else {
                println!("{}", app);
                prompt_line("confirm/cancel: ").await?.trim() == "confirm"
            };
            if confirmed {
                app.confirm_logout()?;
                println!("Logged out");
            } else if let Some(view) = app.wallet_mut() {
                view.cancel_logout();
            }
        }
        Commands::Show { wallet } => {
            let view = logged_in(&mut app)?;
            if let Some(address) = wallet {
                view.select(&address).await;
            }
            println!("{}", app);
        }
        Commands::Import { key } => {
            let view = logged_in(&mut app)?;
            view.select(IMPORT_NEW).await;
            view.import(&key).await;
            let failed = view.error().map(str::to_owned);
            println!("{}", app);
            if let Some(message) = failed {
                return Err(Error::Rejected(message));
            }
        }
        Commands::Send { to, amount, wallet } => {
            let view = logged_in(&mut app)?;
            if let Some(address) = wallet {
                view.select(&address).await;
            }
            view.open_tx_form();
            view.send(&to, &amount).await;
            let failed = view.tx_error().map(str::to_owned);
            println!("{}", app);
            if let Some(message) = failed {
                return Err(Error::Chain(message));
            }
        }
        Commands::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            eth_wallet_client::shell::run(&mut app, stdin, tokio::io::stdout()).await?;
        }
        Commands::Config => {}
    }

    Ok(())
}

async fn start_app(config: &ClientConfig, rpc: RpcConfig) -> Result<App<FileStorage>> {
    tracing::debug!(
        api_url = %config.api_base(),
        rpc_url = %rpc.url(),
        session_file = %config.session_file.display(),
        "Starting wallet client"
    );

    rpc.parsed_url()?;
    let store = SessionStore::load(FileStorage::new(&config.session_file));
    let api = Arc::new(HttpWalletApi::new(config.api_base()));
    let chain = Arc::new(RpcChain::new(
        rpc,
        config.receipt_timeout(),
        config.receipt_poll_interval(),
    ));
    let journal = config.journal_file.as_ref().map(TxJournal::new);

    Ok(App::start(store, api, chain, journal).await)
}

fn logged_in(app: &mut App<FileStorage>) -> Result<&mut eth_wallet_client::views::WalletView> {
    app.wallet_mut()
        .ok_or_else(|| Error::Validation("Not logged in; run `eth-wallet login` first".to_string()))
}

async fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(prompt_line("Password: ").await?.trim_end().to_string()),
    }
}

async fn prompt_line(prompt: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line)
}
