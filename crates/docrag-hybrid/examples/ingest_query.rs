//! Ingests a few short documents with the deterministic embedder and runs
//! a query against them.
//!
//! cargo run -p docrag-hybrid --example ingest_query -- "capital of France"

use std::sync::Arc;

use docrag_core::config::RetrievalSettings;
use docrag_embed::DeterministicEmbedder;
use docrag_hybrid::{format_context, RetrievalEngine};
use tracing_subscriber::EnvFilter;

const DOCS: &[(&str, &str, &str)] = &[
    (
        "https://example.org/paris",
        "Paris",
        "Paris is the capital of France.\n\nIt is known for the Eiffel Tower.",
    ),
    (
        "https://example.org/rome",
        "Rome",
        "Rome is the capital of Italy.\n\nThe Colosseum stands near its centre.",
    ),
    (
        "https://example.org/bread",
        "Bread",
        "Sourdough bread relies on wild yeast and lactic acid bacteria.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let question = std::env::args().nth(1).unwrap_or_else(|| "capital of France".to_string());

    let settings = RetrievalSettings::default();
    let embedder = Arc::new(DeterministicEmbedder::new(settings.embedding.dimension));
    let engine = RetrievalEngine::new(embedder, &settings)?;

    for (uri, title, text) in DOCS {
        engine.ingest(uri, title, text).await?;
    }

    let hits = engine.query_default(&question).await;
    println!("Query: {question}");
    for (i, hit) in hits.iter().enumerate() {
        let marker = if hit.confident { "" } else { " (weak)" };
        println!("{:>2}. [{:.3}{marker}] {} :: {}", i + 1, hit.score, hit.title, hit.content);
    }
    println!("\n{}", format_context(&hits));
    Ok(())
}
