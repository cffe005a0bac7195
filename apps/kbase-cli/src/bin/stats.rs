use kbase_hybrid::HybridEngine;

fn main() -> anyhow::Result<()> {
    kbase_cli::init_tracing();
    let (settings, base) = kbase_cli::load_settings()?;
    let engine = HybridEngine::from_settings(&settings, &base)?;
    println!("{}", serde_json::to_string_pretty(&engine.stats())?);
    Ok(())
}
