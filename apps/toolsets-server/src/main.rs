//! MCP stdio server for toolsets.
//!
//! Configuration is layered: defaults, the global and local `toolsets.json`
//! files, `TOOLSETS_*` environment variables, then command-line flags.
//! Logs go to stderr; stdout carries the MCP transport.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolsets_config::loader::{global_config_path, split_list};
use toolsets_config::types::LoggingConfig;
use toolsets_config::{ConfigPaths, ToolsetsConfig, load_layers, validation};
use toolsets_core::{HostServer, LiveCapabilities};
use toolsets_mcp::{ServiceExt, ToolsetServer, stdio};
use toolsets_registry::{ToolsetOptions, init_toolsets, summarize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "toolsets-server")]
#[command(about = "MCP server exposing toolsets with optional dynamic discovery", version)]
struct Args {
    /// Comma-separated toolsets to enable. Example: repos,issues (default: all)
    #[arg(long, value_name = "NAMES")]
    toolsets: Option<String>,

    /// Expose only read tools
    #[arg(long)]
    read_only: bool,

    /// Start with the discovery tools only; clients enable toolsets at runtime
    #[arg(long)]
    dynamic_toolsets: bool,

    /// Config file used instead of ./toolsets.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List toolsets and exit
    #[arg(long)]
    list_toolsets: bool,

    /// Print the JSON Schema of toolsets.json and exit
    #[arg(long)]
    print_config_schema: bool,
}

/// Merge files, env and flags. Validation is left to the caller.
fn load_config(args: &Args) -> Result<ToolsetsConfig> {
    let paths = match &args.config {
        Some(path) => ConfigPaths {
            local: path.clone(),
            global: global_config_path()?,
        },
        None => ConfigPaths::discover(Path::new("."))?,
    };
    let mut cfg = load_layers(&paths)?;

    // Flags win over files and env
    if let Some(raw) = &args.toolsets {
        cfg.toolsets = split_list(raw);
    }
    if args.read_only {
        cfg.read_only = true;
    }
    if args.dynamic_toolsets {
        cfg.dynamic_toolsets = true;
    }
    Ok(cfg)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_toolsets(group: &toolsets_core::SharedToolsetGroup) {
    let rows = summarize(group);
    println!("Available toolsets ({}):", rows.len());
    for row in rows {
        let state = if row.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        let mode = if row.read_only { " read-only" } else { "" };
        println!(
            "  {} [{state}{mode}] {} tools - {}",
            row.name.bold(),
            row.tools,
            row.description
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config_schema {
        println!("{}", toolsets_config::schema_json_pretty()?);
        return Ok(());
    }

    let cfg = load_config(&args).context("Failed to load toolsets configuration")?;
    init_tracing(&cfg.logging);

    // After flags, so warnings describe the effective config
    for w in validation::validate(&cfg) {
        warn!(code = w.code, path = w.path, "{}", w.message);
    }

    let version = env!("CARGO_PKG_VERSION");
    let live = Arc::new(LiveCapabilities::new());
    let host: Arc<dyn HostServer> = Arc::clone(&live) as Arc<dyn HostServer>;
    let options = ToolsetOptions {
        enabled: cfg.toolsets.clone(),
        read_only: cfg.read_only,
        dynamic_toolsets: cfg.dynamic_toolsets,
        server_name: cfg.server.name.clone(),
        server_version: version.to_string(),
    };
    let group = init_toolsets(&host, &options, &()).context("Failed to initialize toolsets")?;

    if args.list_toolsets {
        print_toolsets(&group);
        return Ok(());
    }

    info!(
        server = %cfg.server.name,
        tools = live.len(),
        "starting MCP server on stdio"
    );

    let server = ToolsetServer::new(live)
        .with_info(&cfg.server.name, version)
        .with_group(group);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
