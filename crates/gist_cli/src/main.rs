use clap::Parser;
use gist_core::{Error, Result};
use gist_inference::{Config, ModelKind, SpeechConfig, SpeechKind};
use gist_news::{NewsApiFeed, ParagraphFetcher, Pipeline, PipelineConfig};
use gist_storage::StorageKind;
use gist_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `30`, `30s`, `2m`, `1h15m30s`; a bare number is seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let overflow = || "Duration is too large".to_string();
        let mut total_seconds = 0u64;
        let mut current_number = String::new();

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_seconds = num
                .checked_mul(unit)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(overflow)?;
            current_number.clear();
        }

        if !current_number.is_empty() {
            let num: u64 = current_number.parse().map_err(|_| overflow())?;
            total_seconds = total_seconds.checked_add(num).ok_or_else(overflow)?;
        }

        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "News digests and deep dives, scripted and voiced", long_about = None)]
struct Cli {
    #[arg(long, env = "GIST_STORAGE", value_enum, default_value_t = StorageKind::Sqlite)]
    storage: StorageKind,
    #[arg(long, env = "GIST_DATABASE", default_value = "gist.db")]
    database: PathBuf,
    /// Articles kept in the store before the oldest are evicted
    #[arg(long, env = "GIST_MAX_ARTICLES", default_value_t = 100)]
    max_articles: usize,
    /// Timeout for each call to an external service (e.g. 30s, 2m)
    #[arg(long, env = "GIST_TIMEOUT", default_value = "30s")]
    timeout: HumanDuration,
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    newsapi_key: Option<String>,
    #[arg(long, env = "NEWSAPI_URL")]
    newsapi_url: Option<String>,
    #[arg(long, env = "GIST_MODEL", value_enum, default_value_t = ModelKind::Groq, help = "Model used for summaries and scripts")]
    model: ModelKind,
    /// OpenAI-compatible chat-completions base URL
    #[arg(long, env = "GIST_MODEL_URL")]
    model_url: Option<String>,
    #[arg(long, env = "GROQ_GIST", hide_env_values = true)]
    groq_key: Option<String>,
    #[arg(long, env = "GIST_SPEECH", value_enum, default_value_t = SpeechKind::Unreal)]
    speech: SpeechKind,
    #[arg(long, env = "UNREAL_API_KEY", hide_env_values = true)]
    unreal_key: Option<String>,
    #[arg(long, env = "UNREAL_VOICE")]
    voice: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "GIST_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Fetch, process and store the current top headlines once
    Fetch {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

async fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let storage = gist_storage::create_storage(cli.storage, &cli.database).await?;

    let model = gist_inference::create_model(
        cli.model,
        Config {
            api_key: cli.groq_key.clone(),
            model_url: cli.model_url.clone(),
            ..Default::default()
        },
    )?;
    info!("🧠 Inference model ready (using {})", model.name());

    let synthesizer = gist_inference::create_synthesizer(
        cli.speech,
        SpeechConfig {
            api_key: cli.unreal_key.clone(),
            base_url: None,
            voice_id: cli.voice.clone(),
        },
    )?;
    info!("🔊 Speech synthesizer ready (using {})", synthesizer.name());

    let feed = NewsApiFeed::new(cli.newsapi_key.clone(), cli.newsapi_url.clone())?;
    let fetcher = ParagraphFetcher::new()?;

    Ok(Pipeline::new(
        storage,
        Arc::new(feed),
        Arc::new(fetcher),
        model,
        synthesizer,
        PipelineConfig {
            max_articles: cli.max_articles,
            timeout: cli.timeout.0,
        },
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if cli.max_articles == 0 {
        return Err(Error::Config("--max-articles must be at least 1".to_string()));
    }
    let pipeline = build_pipeline(&cli).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let app = gist_web::create_app(AppState {
                pipeline: Arc::new(pipeline),
            });
            let listener = tokio::net::TcpListener::bind(bind).await?;
            info!("🚀 Listening on {}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Fetch { count } => {
            let articles = pipeline.fetch_and_store(count).await?;
            info!("✨ {} articles up to date", articles.len());
            for article in articles {
                println!("- {}", article.title);
            }
        }
    }

    Ok(())
}
