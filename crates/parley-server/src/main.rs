use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use parley_contract::executor::{
    parse_messages_input, AgentExecutor, ChunkSink, ExecutionError, InputError, OutputChunk,
    RunContext, RunObserver,
};
use parley_contract::thread::{Message, Role};
use parley_runtime::AgentRuntime;
use parley_server::ingest::UploadDirIngestor;
use parley_server::AppState;
use parley_store_adapters::FileStore;
use serde_json::Value;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "parley-server", about = "Chat-agent backend server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PARLEY_HTTP_ADDR", default_value = "127.0.0.1:8100")]
    http_addr: String,

    /// Directory for assistant and thread records.
    #[arg(long, env = "PARLEY_STORAGE_DIR", default_value = "./data")]
    storage_dir: PathBuf,

    /// Directory for ingested documents.
    #[arg(long, env = "PARLEY_UPLOAD_DIR", default_value = "./uploads")]
    upload_dir: PathBuf,

    /// Directory with the static UI bundle.
    #[arg(long, env = "PARLEY_UI_DIR", default_value = "./ui")]
    ui_dir: PathBuf,

    /// Assistant ids to feature on the public listing. Repeatable.
    #[arg(
        long = "featured-assistant",
        env = "PARLEY_FEATURED_ASSISTANTS",
        value_delimiter = ','
    )]
    featured_assistants: Vec<String>,
}

/// Demo executor: echoes the latest user message back one word at a time.
/// Stands in for a real engine in local development.
struct EchoAgent;

#[async_trait]
impl AgentExecutor for EchoAgent {
    fn validate_input(&self, _ctx: &RunContext, raw: &Value) -> Result<Vec<Message>, InputError> {
        parse_messages_input(raw)
    }

    async fn execute(
        &self,
        input: &[Message],
        _ctx: &RunContext,
        observer: &dyn RunObserver,
        sink: &dyn ChunkSink,
    ) -> Result<(), ExecutionError> {
        observer.record_run_id(&uuid::Uuid::now_v7().simple().to_string());

        let reply = input
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        for word in reply.split_whitespace() {
            let chunk = OutputChunk::new(serde_json::json!({
                "role": "assistant",
                "content": word,
            }));
            if sink.on_chunk(chunk).await.is_err() {
                return Ok(());
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let state = AppState {
        runtime: AgentRuntime::new(Arc::new(EchoAgent)),
        storage: Arc::new(FileStore::new(&args.storage_dir)),
        ingestor: Arc::new(UploadDirIngestor::new(&args.upload_dir)),
        featured_assistants: Arc::new(args.featured_assistants.clone()),
    };

    let app = parley_server::app(state)
        .fallback_service(ServeDir::new(&args.ui_dir).append_index_html_on_directories(true));

    let listener = tokio::net::TcpListener::bind(&args.http_addr)
        .await
        .expect("bind http listener");
    tracing::info!(addr = %args.http_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .expect("http server failed");
}
