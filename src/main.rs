use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use railsecure::advisories::{self, AdvisorySource, NvdClient};
use railsecure::api::{self, AppState};
use railsecure::config::AppConfig;
use railsecure::generation::OpenAiGenerator;
use railsecure::models::PasswordOptions;
use railsecure::password::{self, ZxcvbnEstimator};
use railsecure::session::SessionRegistry;

#[derive(Parser)]
#[command(name = "railsecure")]
#[command(about = "Security awareness training service for rail staff")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
    },
    /// Print recently published CVEs
    Advisories {
        /// Look-back window in days
        #[arg(short, long, default_value_t = advisories::DEFAULT_WINDOW_DAYS)]
        days: u32,

        /// Maximum advisories to show
        #[arg(short, long, default_value_t = advisories::DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Password tools
    Password {
        #[command(subcommand)]
        command: PasswordCommand,
    },
}

#[derive(Subcommand)]
enum PasswordCommand {
    /// Score how hard a password is to guess
    Check {
        candidate: String,
    },
    /// Generate a random password
    Generate {
        #[arg(short, long, default_value_t = 12)]
        length: usize,

        #[arg(long)]
        no_uppercase: bool,

        #[arg(long)]
        no_digits: bool,

        #[arg(long)]
        no_symbols: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "railsecure=debug,tower_http=debug".into()),
    );

    // stdout carries command output for the one-shot commands
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let sessions = SessionRegistry::new();
    let advisories: Arc<dyn AdvisorySource> = Arc::new(NvdClient::from_config(&config.nvd)?);

    let mut state = AppState::new(sessions.clone(), advisories)
        .with_generation_rate_limit(config.security.generation_rate_limit)
        .with_cors_origins(config.security.cors_origins.clone());

    match OpenAiGenerator::from_config(&config.openai)? {
        Some(generator) => {
            tracing::info!(model = generator.model(), "AI features enabled");
            state = state.with_generator(Arc::new(generator));
        }
        None => tracing::warn!("OPENAI_API_KEY not set; AI features are disabled"),
    }
    if let Some(key) = config.security.api_key.clone() {
        state = state.with_api_key(key);
    }

    let max_idle = Duration::from_secs(config.sessions.idle_timeout_secs);
    let every = Duration::from_secs(config.sessions.sweep_interval_secs.max(1));
    sessions.spawn_sweeper(max_idle, every);
    if let Some(limiter) = state.limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("railsecure listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn print_advisories(config: AppConfig, days: u32, limit: usize) -> anyhow::Result<()> {
    let client = NvdClient::from_config(&config.nvd)?;
    let days = advisories::clamp_window(days);
    let found = client.recent(days, limit.clamp(1, advisories::MAX_LIMIT)).await?;

    if found.is_empty() {
        println!("No CVEs published in the last {} days.", days);
        return Ok(());
    }
    for advisory in found {
        let score = advisory
            .severity_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "n/a".to_string());
        let severity = match (&advisory.severity, advisory.band()) {
            (Some(label), _) => label.clone(),
            (None, Some(band)) => band.as_str().to_uppercase(),
            (None, None) => "UNKNOWN".to_string(),
        };
        let published = advisory
            .published
            .map(|p| p.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        println!("{} [{} {}] {}", advisory.identifier, severity, score, published);
        println!("  {}", advisory.description);
        println!("  {}", advisory.url);
    }
    Ok(())
}

fn run_password(command: PasswordCommand) {
    match command {
        PasswordCommand::Check { candidate } => {
            let report = password::check_strength(&ZxcvbnEstimator, &candidate, &[]);
            println!("Strength: {}", report.level.label());
            for line in report.feedback {
                println!("  {}", line);
            }
        }
        PasswordCommand::Generate {
            length,
            no_uppercase,
            no_digits,
            no_symbols,
        } => {
            let options = PasswordOptions {
                length,
                uppercase: !no_uppercase,
                digits: !no_digits,
                symbols: !no_symbols,
            };
            println!("{}", password::generate_password(&options));
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { port, host }) => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            serve(config).await?;
        }
        Some(Commands::Advisories { days, limit }) => {
            print_advisories(config, days, limit).await?;
        }
        Some(Commands::Password { command }) => run_password(command),
        None => serve(config).await?,
    }

    Ok(())
}
