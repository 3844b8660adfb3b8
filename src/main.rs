use std::path::Path;
use std::sync::Arc;

use tokio::sync::Notify;

mod config;
mod edge;
mod handler;
mod http;
mod logger;
mod server;
mod store;

use edge::wire;
use store::{FsObjectStore, ObjectStore};

/// What the process was asked to do
enum Command {
    /// Run the edge server
    Serve { config_path: String },
    /// Run one edge event file through the pipeline and print the response
    Invoke { event_path: String, config_path: String },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let first = args.next();
    match first.as_deref() {
        Some("invoke") => {
            let event_path = args
                .next()
                .ok_or_else(|| "usage: blog_edge invoke <event.json> [config]".to_string())?;
            let config_path = args
                .next()
                .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
            Ok(Command::Invoke {
                event_path,
                config_path,
            })
        }
        Some("serve") => Ok(Command::Serve {
            config_path: args
                .next()
                .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string()),
        }),
        Some(path) => Ok(Command::Serve {
            config_path: path.to_string(),
        }),
        None => Ok(Command::Serve {
            config_path: config::DEFAULT_CONFIG_PATH.to_string(),
        }),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = parse_args(std::env::args().skip(1))?;
    let config_path = match &command {
        Command::Serve { config_path } | Command::Invoke { config_path, .. } => config_path,
    };
    let cfg = config::Config::load_from(config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(cfg.store.root.as_str()));
    if !Path::new(&cfg.store.root).is_dir() {
        logger::log_warning(&format!(
            "Object store root '{}' is not a directory; every origin read will miss",
            cfg.store.root
        ));
    }
    let state = Arc::new(config::AppState::new(cfg, store)?);

    match command {
        Command::Serve { .. } => runtime.block_on(serve(state)),
        Command::Invoke { event_path, .. } => runtime.block_on(invoke(&state, &event_path)),
    }
}

async fn serve(state: Arc<config::AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &state.config);
    let patterns: Vec<String> = state
        .pipeline
        .routes()
        .behaviors()
        .iter()
        .map(|b| b.pattern.clone())
        .collect();
    logger::log_behaviors(&patterns);

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;
    server::start_server_loop(listener, state, shutdown).await?;
    Ok(())
}

/// Run one edge event file and print the response
async fn invoke(
    state: &config::AppState,
    event_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = tokio::fs::read(event_path).await?;
    let encoded = run_event(state, &event).await?;
    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}

/// Decode an edge event and run the stages of its execution point
///
/// Viewer events go through the full viewer pipeline and answer in the
/// viewer shape; origin events only get the origin action and answer in
/// the origin shape.
async fn run_event(
    state: &config::AppState,
    event: &[u8],
) -> Result<serde_json::Value, wire::WireError> {
    let (request, point) = wire::decode_event(event, &state.origin)?;
    let response = match point {
        wire::ExecutionPoint::Viewer => state.pipeline.handle(request).await,
        wire::ExecutionPoint::Origin => state.pipeline.handle_origin(request).await,
    };
    wire::encode_response(&response, point)
}
