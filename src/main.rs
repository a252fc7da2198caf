use anyhow::Context;
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf-app bootstrap starting"
    );

    bookshelf_app::run(settings).await?;

    tracing::info!("bookshelf-app shut down");
    Ok(())
}
