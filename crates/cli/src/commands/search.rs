//! `ragchat search`: Show what context a query retrieves.

use std::path::Path;

pub async fn run(
    config_path: &Path,
    query: &str,
    use_rag: bool,
    use_web: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let orchestrator = super::build_orchestrator(&config);

    let context = orchestrator.retrieve(query, use_rag, use_web).await;
    let block = context.block();

    if block.is_empty() {
        println!("No context found for \"{}\".", query.trim());
    } else {
        println!("{block}");
    }

    Ok(())
}
