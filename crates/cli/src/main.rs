use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookshelf", version, about = "Book records API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the merged OpenAPI document
    Openapi {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf CLI serving");
            bookshelf_app::run(settings).await
        }
        Command::Openapi { pretty } => {
            let registry = bookshelf_app::build_registry(&settings)?;
            let document = bookshelf_http::router::openapi_document(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{}", rendered);
            Ok(())
        }
    }
}
