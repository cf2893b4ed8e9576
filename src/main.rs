//! hma — hierarchical multi-agent orchestrator
//!
//! Usage:
//!   hma run --project ./myapp --goal "add a health endpoint"
//!   hma run --project . --goal "..." --config hma.toml
//!   hma version

use clap::{Parser, Subcommand};
use hma_agent::AgentNode;
use hma_core::RuntimeConfig;
use hma_llm::{AnthropicLlmProvider, ConsoleLlmProvider, LlmProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "hma",
    about = "Hierarchical multi-agent orchestrator",
    version = env!("CARGO_PKG_VERSION"),
    long_about = "hma runs a tree of Manager/Coder/Tester agents against a project \
                   directory, each speaking a small directive language and making at \
                   most one LLM call at a time."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the root Master agent against a project directory
    Run {
        /// Project root the agent tree operates on
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Initial goal handed to the Master agent
        #[arg(short, long)]
        goal: String,

        /// Path to a TOML config file (see `RuntimeConfig`)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write logs to a file in addition to stderr
        #[arg(long)]
        log_file: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) | None => {
            println!("hma v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Run {
            project,
            goal,
            config,
            log_file,
        }) => {
            let _guard = init_tracing(log_file.as_deref());
            run(project, goal, config).await
        }
    }
}

/// Returns the non-blocking writer's guard, which must stay alive for the
/// duration of `main` or the file layer stops flushing.
fn init_tracing(log_file: Option<&str>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hma=info".into());

    match log_file {
        Some(path) => {
            let parent = std::path::Path::new(path).parent().filter(|p| !p.as_os_str().is_empty());
            let dir = parent.unwrap_or_else(|| std::path::Path::new("."));
            let file_name = std::path::Path::new(path).file_name().expect("log_file must name a file");
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).json())
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}

async fn run(project: PathBuf, goal: String, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let project_root = project
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("project root {} not found: {}", project.display(), e))?;

    let mut config = match config_path {
        Some(path) => RuntimeConfig::load(&path)?,
        None => RuntimeConfig::default(),
    };
    config.project_root = project_root.clone();
    let config = Arc::new(config);

    let llm: Arc<dyn LlmProvider> = if config.uses_console_provider() {
        tracing::info!("no API key configured, falling back to the console provider");
        Arc::new(ConsoleLlmProvider)
    } else {
        let api_key = config.resolve_api_key().expect("checked by uses_console_provider");
        Arc::new(AnthropicLlmProvider::new(api_key, config.model.clone()))
    };

    tracing::info!(project = %project_root.display(), "starting master agent");
    let master = AgentNode::new_master(project_root);
    // The master prompter keeps retrying on recoverable errors and runs as
    // its own task rather than being awaited directly here; it only stops
    // once the Master FINISHes and deactivates itself.
    tokio::spawn(hma_agent::master_prompter(master.clone(), goal, llm, config));

    while master.core().is_active() {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }

    if let Some(result) = master.core().final_result().await {
        println!("{}", result);
    }

    Ok(())
}
