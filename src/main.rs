use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use showreel::{chat, web_server, Assistant, Catalog, Session, Settings};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the portfolio page and its live sessions.
    Serve {
        #[arg(long, default_value_t = 8080, help = "Port for the web server.")]
        port: u16,
        #[command(flatten)]
        settings: Settings,
    },
    /// Browse the portfolio and talk to the assistant in the terminal.
    Chat {
        #[arg(long, help = "1-based position of the item to start on.")]
        start: Option<usize>,
        #[command(flatten)]
        settings: Settings,
    },
    /// Print the portfolio catalog.
    Catalog {
        #[arg(long, help = "Print JSON instead of a table.")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for SHOWREEL_API_KEY and friends)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,showreel=debug).
    // Logs go to stderr so they never mix with terminal chat output.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = Arc::new(Catalog::builtin());

    match cli.command {
        Commands::Serve { port, settings } => {
            info!("Starting showreel on port {}...", port);
            let assistant = Arc::new(Assistant::from_settings(
                catalog.owner(),
                catalog.owner_first_name(),
                &settings,
            ));
            let state = web_server::AppState::new(
                catalog,
                assistant,
                settings.templates.clone(),
                settings.static_dir.clone(),
            );

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, state).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat { start, settings } => {
            let assistant = Assistant::from_settings(catalog.owner(), catalog.owner_first_name(), &settings);
            let mut session = Session::new(catalog);
            if let Some(position) = start {
                session
                    .jump_to(position.saturating_sub(1))
                    .context("Invalid --start")?;
            }

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            chat::run_terminal_chat(session, &assistant, stdin, &mut stdout)
                .await
                .context("Chat session failed")?;
        }
        Commands::Catalog { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(catalog.as_ref()).context("Failed to serialize catalog")?
                );
            } else {
                println!("{}", catalog.owner());
                for (i, item) in catalog.items().iter().enumerate() {
                    println!("{:>2}. {:<30} {:<22} {}", i + 1, item.title, item.category, item.date);
                }
            }
        }
    }

    Ok(())
}
