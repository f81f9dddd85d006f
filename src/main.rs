// src/main.rs

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use metis_balance_agent::{
    agent::{
        knowledge::builtin_knowledge, prompts, Agent, Backend, KnowledgeStore, OfflineModel,
        OpenAiChat, WindowBufferMemory,
    },
    api::create_router,
    blockchain::{BalanceAdapter, RpcChainReader},
    cli::{banner, run_session},
    config::Config,
    AppState,
};
use tokio::io::{self, AsyncWriteExt};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = create_router(state);
    info!("🚀 HTTP Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("HTTP server failed")
}

// --- Interactive Session ---
async fn run_cli(state: AppState) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(banner(&state).as_bytes()).await?;
    let stdin = io::BufReader::new(io::stdin());
    run_session(&state, stdin, stdout).await?;
    info!("Session ended");
    Ok(())
}

fn load_knowledge(config: &Config) -> Option<KnowledgeStore> {
    match &config.knowledge_file {
        Some(path) => match KnowledgeStore::load(path) {
            Ok(store) => {
                info!("✅ Knowledge base loaded from {} ({} chunks)", path.display(), store.len());
                Some(store)
            }
            Err(e) => {
                warn!("⚠️ Knowledge base setup failed: {:#}. Continuing without it.", e);
                None
            }
        },
        None => Some(KnowledgeStore::from_text(&builtin_knowledge(&config.network))),
    }
}

fn build_agent(config: &Config) -> Result<Agent<Backend>> {
    let backend = match &config.llm_api_key {
        Some(key) => {
            let chat = OpenAiChat::new(&config.llm_api_url, key.clone(), &config.llm_model, config.llm_timeout)?;
            info!("Using language model {} at {}", chat.model(), config.llm_api_url);
            Backend::OpenAi(chat)
        }
        None => {
            warn!("LLM_API_KEY is not set; the assistant runs in offline mode");
            Backend::Offline(OfflineModel)
        }
    };
    Ok(Agent::new(
        prompts::preamble(&config.network),
        backend,
        WindowBufferMemory::new(config.memory_window),
    )
    .with_knowledge(load_knowledge(config)))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

async fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = Config::load(flag_value(&args, "--network").as_deref())
        .context("Failed to load configuration")?;
    info!("Using {} (chain id {}) via {}", config.network.name, config.network.chain_id, config.network.rpc_url);

    let reader = RpcChainReader::new(&config.network.rpc_url, config.rpc_timeout)?;
    match reader.chain_id().await {
        Ok(id) if id == config.network.chain_id => info!("RPC endpoint reports chain id {}", id),
        Ok(id) => warn!(
            "RPC endpoint reports chain id {} but {} expects {}",
            id, config.network.name, config.network.chain_id
        ),
        Err(e) => warn!("Could not verify chain id: {}", e),
    }

    let adapter = BalanceAdapter::new(reader)?;
    let agent = build_agent(&config)?;
    let state = AppState::new(config, adapter, agent);

    if args.iter().any(|a| a == "--http") || env::var("HTTP_MODE").is_ok() {
        run_http_server(state).await
    } else {
        run_cli(state).await
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays the conversation channel
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metis_balance_agent=info,metis_agent=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}
