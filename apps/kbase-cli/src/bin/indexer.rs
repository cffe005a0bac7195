use std::env;
use std::time::Instant;

use kbase_core::corpus::CorpusLoader;
use kbase_hybrid::HybridEngine;

fn main() -> anyhow::Result<()> {
    kbase_cli::init_tracing();
    let (mut settings, base) = kbase_cli::load_settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    if let Some(path) = kbase_cli::positional(&args, &[]).into_iter().next() {
        settings.knowledge_base_path = path;
    }

    let kb_path = settings.knowledge_base_path(&base);
    let index_dir = settings.index_dir(&base);
    println!("kbase indexer\n=============");
    println!("Knowledge base: {}", kb_path.display());
    println!("Index directory: {}", index_dir.display());

    let started = Instant::now();
    let corpus = CorpusLoader::new().with_store_label(settings.store_label.clone()).load(&kb_path)?;
    let embedder = kbase_embed::default_embedder(&settings, &base)?;
    let mut engine = HybridEngine::new(corpus, embedder).with_batch_size(settings.batch_size);
    engine.build()?;
    engine.save(&index_dir).inspect_err(|e| tracing::error!(error = %e, dir = %index_dir.display(), "saving indices failed"))?;

    let stats = engine.stats();
    println!("\n✅ Indexed {} documents ({} sections, {} locations) in {:.1}s", stats.total_documents, stats.total_sections, stats.total_locations, started.elapsed().as_secs_f32());
    println!("📊 model={} dim={} lexical={}", stats.model_name, stats.embedding_dim, stats.has_lexical_index);
    println!("\n💡 To search, use: cargo run --bin kbase-search '<query>'");
    Ok(())
}
