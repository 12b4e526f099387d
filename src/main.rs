//! edge-router binary: load the build outputs, wire the routing engine to
//! an HTTP listener, and serve.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use edge_router::config::{load_config, AdapterConfig};
use edge_router::http::HttpServer;
use edge_router::lifecycle::Shutdown;
use edge_router::manifest::load_manifest;
use edge_router::observability::{logging, metrics};
use edge_router::output::BuildOutput;
use edge_router::routing::router::EdgeRouter;
use edge_router::serve::{DiskAssets, FunctionRegistry};

#[derive(Debug, Parser)]
#[command(name = "edge-router", about = "Request router for edge-deployed builds")]
struct Args {
    /// Path to the adapter settings file.
    #[arg(long, default_value = "edge-router.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        AdapterConfig::default()
    };

    logging::init_logging(&config.observability);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        manifest = %config.build.manifest_path,
        "edge-router starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let manifest = Arc::new(load_manifest(Path::new(&config.build.manifest_path))?);
    let mut output = BuildOutput::load(Path::new(&config.build.output_path))?;
    output.apply_overrides(&manifest.overrides);

    tracing::info!(
        entries = output.len(),
        base_path = %manifest.base_path,
        "Build output loaded"
    );

    let functions = FunctionRegistry::new();
    if output.has_functions() && functions.is_empty() {
        tracing::warn!(
            "Entry map contains function entries but no handlers are registered; \
             function routes will fail until a host registers them"
        );
    }

    let router = Arc::new(EdgeRouter::new(
        manifest,
        Arc::new(output),
        Arc::new(DiskAssets::new(&config.build.assets_dir)),
        Arc::new(functions),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, router);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
