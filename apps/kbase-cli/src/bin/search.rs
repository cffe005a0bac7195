use std::env;
use std::sync::Arc;

use kbase_hybrid::{render_context, render_sources, HybridEngine, InitGate, SearchParams};

const VALUE_FLAGS: &[&str] = &["--top-k", "--min-score"];

fn main() -> anyhow::Result<()> {
    kbase_cli::init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    let query = kbase_cli::positional(&args, VALUE_FLAGS).join(" ");
    if query.trim().is_empty() {
        eprintln!("Usage: kbase-search <query> [--top-k N] [--min-score S] [--context]");
        eprintln!("Example: kbase-search 'доставка в Гродно' --top-k 7");
        std::process::exit(1);
    }

    let (settings, base) = kbase_cli::load_settings()?;
    let with_context = args.iter().any(|a| a == "--context");
    // Context mode gathers as many hits as answer generation would.
    let mut params = if with_context {
        SearchParams { min_score: settings.min_score, ..SearchParams::answer() }
    } else {
        SearchParams::from(&settings)
    };
    if let Some(k) = kbase_cli::flag_value(&args, "--top-k")? { params.top_k = k; }
    if let Some(s) = kbase_cli::flag_value(&args, "--min-score")? { params.min_score = s; }

    let gate = InitGate::new(move || Ok(HybridEngine::from_settings(&settings, &base)?));
    let _ = gate.poll();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let engine: Arc<HybridEngine> = match runtime.block_on(gate.wait()).ready() {
        Some(engine) => engine,
        None => {
            let reason = gate.last_error().unwrap_or_default();
            tracing::error!(error = %reason, "search engine failed to start");
            anyhow::bail!("search engine failed to start: {reason}");
        }
    };

    let hits = engine.search_with(&query, &params)?;
    tracing::debug!(query = %query, top_k = params.top_k, hits = hits.len(), "query answered");
    println!("🔍 Found {} results for: \"{}\" (top_k={}, min_score={:.2})", hits.len(), query, params.top_k, params.min_score);
    for (i, hit) in hits.iter().enumerate() {
        println!("\n  {}. score={:.4}  id={}  kind={:?}", i + 1, hit.score, hit.document.id, hit.document.kind());
        println!("     📝 {}", hit.document.text);
    }
    if !hits.is_empty() {
        println!("\n{}", render_sources(&hits, kbase_hybrid::render::SOURCES_LIMIT));
    }
    if with_context {
        println!("\n--- context ---\n{}", render_context(&hits, kbase_hybrid::render::CONTEXT_LIMIT));
    }
    Ok(())
}
