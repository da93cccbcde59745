//! # permctx
//!
//! Operator CLI: resolves contexts for a hypothetical subject, lists the
//! potential contexts a host would report, and shows what a world name
//! rewrites to, all against the configured settings.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use permctx_core::{ResourceKey, SubjectId, WorldView};
use permctx_engine::calculators::{
    GameModeCalculator, StaticCalculator, WorldCalculator, shared_rewrites,
};
use permctx_engine::host::memory::{MemoryHost, MemorySubject};
use permctx_engine::{ContextManager, init_context_manager};
use permctx_settings::PermctxSettings;
use serde_json::json;

/// Inspect context resolution.
#[derive(Parser, Debug)]
#[command(name = "permctx", about = "Inspect permission context resolution")]
struct Cli {
    /// Settings file (defaults to `~/.permctx/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the contexts of a subject in the given state.
    Resolve {
        /// World the subject stands in, e.g. `arena` or `mymod:arena`.
        #[arg(long)]
        world: Option<String>,

        /// Dimension type of that world.
        #[arg(long, default_value = "overworld")]
        dimension: String,

        /// Treat the world as client-local.
        #[arg(long)]
        client: bool,

        /// Game mode, e.g. `creative`.
        #[arg(long)]
        gamemode: Option<String>,
    },
    /// List every context the host could produce.
    Estimate {
        /// Worlds loaded on a running server. Without any, the server is
        /// treated as unavailable.
        #[arg(long = "world")]
        worlds: Vec<String>,
    },
    /// Show what a raw world name rewrites to.
    Rewrite {
        /// Raw world name.
        world: String,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<PermctxSettings> {
    let path = path.cloned().unwrap_or_else(permctx_settings::settings_path);
    permctx_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn parse_key(raw: &str) -> Result<ResourceKey> {
    ResourceKey::parse(raw).with_context(|| format!("Invalid identifier: {raw:?}"))
}

/// Wire the built-in calculators against `host`.
fn build_manager(settings: &PermctxSettings, host: &Arc<MemoryHost>) -> Result<ContextManager> {
    let manager = ContextManager::new();
    manager.register_calculator(Arc::new(WorldCalculator::new(
        Arc::clone(host) as Arc<dyn permctx_engine::Host>,
        shared_rewrites(settings.contexts.rewrite_table()),
    )))?;
    manager.register_calculator(Arc::new(GameModeCalculator::new(
        Arc::clone(host) as Arc<dyn permctx_engine::Host>,
    )))?;

    let statics = settings.contexts.static_context_set();
    if !statics.is_empty() {
        manager.register_calculator(Arc::new(StaticCalculator::new(statics)))?;
    }
    Ok(manager)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;

    if cli.json_logs {
        permctx_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        permctx_core::logging::init_subscriber(&settings.logging.level);
    }

    let host = Arc::new(MemoryHost::vanilla());
    let manager = Arc::new(build_manager(&settings, &host)?);
    init_context_manager(Arc::clone(&manager))?;
    tracing::debug!(calculators = ?manager.calculator_names(), "context manager ready");

    let output = match cli.command {
        Command::Resolve {
            world,
            dimension,
            client,
            gamemode,
        } => {
            let mut subject = MemorySubject::new(SubjectId::new());
            if let Some(world) = world {
                let key = parse_key(&world)?;
                let dimension = parse_key(&dimension)?;
                let view = if client {
                    WorldView::client(key, dimension)
                } else {
                    WorldView::server(key, dimension)
                };
                subject = subject.with_location(view);
            }
            if let Some(mode) = gamemode {
                subject = subject.with_game_mode(parse_key(&mode)?);
            }
            json!({ "contexts": manager.query(&subject) })
        }
        Command::Estimate { worlds } => {
            if !worlds.is_empty() {
                let keys = worlds
                    .iter()
                    .map(|w| parse_key(w))
                    .collect::<Result<Vec<_>>>()?;
                let _server = host.start_server(keys);
            }
            json!({ "potentialContexts": manager.estimate_potential_contexts() })
        }
        Command::Rewrite { world } => {
            let table = settings.contexts.rewrite_table();
            let name = parse_key(&world)?.context_name();
            json!({ "world": name, "rewritten": table.rewrite(&name) })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
