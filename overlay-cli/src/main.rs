//! # Saorsa Overlay Inspector
//!
//! Command-line access to annotated documents.

use clap::Parser;
use overlay_cli::{page_summaries, render_page, CliArgs, Command};
use overlay_core::{Document, PersistenceGateway};
use overlay_gateway::HttpGateway;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing on stderr.
///
/// `RUST_LOG` controls levels; `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,overlay_cli=info,overlay_gateway=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = args.gateway_config()?;
    tracing::debug!("Document service at {}", config.base_url);
    let gateway = HttpGateway::new(&config)?;

    match args.command {
        Command::List { json } => {
            let documents = gateway.list_documents().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                for doc in &documents {
                    println!("{}\t{}\t{}\t{}", doc.id, doc.file_type, doc.date, doc.filename);
                }
            }
        }
        Command::Show { id, json } => {
            let document = Document::from_loaded(gateway.load_document(&id).await?);
            let summaries = page_summaries(&document);
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!(
                    "{} ({}), {} pages, {} annotations",
                    document.filename,
                    document.id,
                    document.page_count(),
                    document.annotations.len()
                );
                for summary in &summaries {
                    println!("  {summary}");
                }
            }
        }
        Command::Render {
            id,
            page,
            width,
            height,
            dpr,
            out,
        } => {
            let document = Document::from_loaded(gateway.load_document(&id).await?);
            let svg = render_page(&document, page, width, height, dpr)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, svg)?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => println!("{svg}"),
            }
        }
        Command::Delete { id } => {
            gateway.delete_document(&id).await?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}
