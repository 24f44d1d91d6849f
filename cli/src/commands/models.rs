use anyhow::Result;
use kingchat_core::Config;
use kingchat_ollama::{Backend, ModelTag};

pub async fn execute() -> Result<()> {
    let config = Config::load()?;
    let client = super::ollama_client(&config)?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No models installed on {}.", client.base_url());
        println!("\nRun `ollama pull {}` to download one.", config.ollama.default_model);
        return Ok(());
    }

    println!("{:<40} {:<10} {:<10} {}", "NAME", "SIZE", "PARAMS", "CONFIGURED");
    println!("{}", "-".repeat(72));

    for model in &models {
        let size = format!("{:.2} GB", model.size as f64 / 1_073_741_824.0);
        let params = model
            .details
            .as_ref()
            .and_then(|d| d.parameter_size.clone())
            .unwrap_or_else(|| "-".to_string());
        let configured = config
            .ollama
            .models
            .iter()
            .any(|name| matches_tag(name, model));
        println!(
            "{:<40} {:<10} {:<10} {}",
            model.name,
            size,
            params,
            if configured { "yes" } else { "" }
        );
    }

    Ok(())
}

/// Ollama reports "phi" as "phi:latest"
pub fn matches_tag(configured: &str, tag: &ModelTag) -> bool {
    tag.name == configured
        || (!configured.contains(':') && tag.name == format!("{}:latest", configured))
}
