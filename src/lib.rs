//! Bookshelf application library
//!
//! Wires the project modules onto the kernel registry, the document store and
//! the HTTP server.

pub mod modules;

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Open the configured store and register every module against it
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let db = Database::open(&settings.database).context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db).context("failed to register modules")?;
    Ok(registry)
}

/// Run the application until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
