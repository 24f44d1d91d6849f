use anyhow::Result;
use kingchat_core::Config;
use kingchat_ollama::Backend;

use super::models::matches_tag;

pub async fn execute() -> Result<()> {
    let config = Config::load()?;
    let client = super::ollama_client(&config)?;

    println!("kingchat status\n");
    println!("Config: {:?}", Config::config_path()?);
    println!("Persona: {}", config.persona.name);
    println!("Ollama: {}", client.base_url());

    let version = match client.version().await {
        Ok(version) => version,
        Err(e) => {
            println!("  not reachable ({})", e);
            println!("\nStart Ollama with `ollama serve`.");
            return Ok(());
        }
    };
    println!("  running, version {}", version);

    let installed = client.list_models().await?;
    println!("\nConfigured models:");
    let mut missing = Vec::new();
    for model in &config.ollama.models {
        let available = installed.iter().any(|tag| matches_tag(model, tag));
        let marker = if model == &config.ollama.default_model { " (default)" } else { "" };
        println!(
            "  {:<30} {}{}",
            model,
            if available { "installed" } else { "missing" },
            marker
        );
        if !available {
            missing.push(model.as_str());
        }
    }

    for model in missing {
        println!("\nRun `ollama pull {}` to install it.", model);
    }

    Ok(())
}
