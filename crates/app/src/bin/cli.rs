// CRM session - command line front end

use clap::{Parser, Subcommand};
use tracing::{error, info};

use crm_app::config::Config;
use crm_app::{create_session_manager, mint_token, status, MintRequest};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and drive the CRM dashboard session", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current session as JSON
    Status,
    /// Store a freshly issued bearer token
    Login {
        #[arg(env = "CRM_AUTH_TOKEN")]
        token: String,
    },
    /// Clear the stored session
    Logout,
    /// Print the Authorization header for API calls
    Header,
    /// Forget the session after the API answered 401
    Unauthorized,
    /// Mint a local development token the API will not trust
    Mint {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        profile_pic: Option<String>,
        /// Lifetime in seconds; omitted means the token never expires locally
        #[arg(long)]
        ttl_secs: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e:#}");
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.rust_log)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    let args = Args::parse();

    // Minting works without touching the store
    let open = || {
        info!(store = %config.store_path.display(), "Opening session store");
        create_session_manager(&config)
    };

    match args.command {
        Command::Status => {
            let manager = open();
            println!("{}", serde_json::to_string_pretty(&status(&manager))?);
        }
        Command::Login { token } => {
            let manager = open();
            manager.login(&token).map_err(|e| {
                error!(error = %e, "Login failed");
                anyhow::anyhow!("Login failed: {e}")
            })?;
            println!("{}", serde_json::to_string_pretty(&status(&manager))?);
        }
        Command::Logout => open().logout(),
        Command::Header => match open().authorization_header() {
            Some(header) => println!("Authorization: {header}"),
            None => anyhow::bail!("Not signed in"),
        },
        Command::Unauthorized => open().handle_unauthorized(),
        Command::Mint {
            email,
            name,
            role,
            profile_pic,
            ttl_secs,
        } => {
            let token = mint_token(MintRequest {
                email,
                name,
                role,
                profile_pic,
                ttl_secs,
            })?;
            println!("{token}");
        }
    }

    Ok(())
}
