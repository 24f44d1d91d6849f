use anyhow::Result;
use kingchat_core::Config;

pub async fn execute(key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = Config::load()?;

    match (key, value) {
        // Show all config
        (None, None) => {
            println!("Configuration file: {:?}\n", Config::config_path()?);
            println!("[server]");
            println!("  host = \"{}\"", config.server.host);
            println!("  port = {}", config.server.port);
            println!();
            println!("[ollama]");
            println!("  base_url = \"{}\"", config.ollama.base_url);
            println!("  timeout_secs = {}", config.ollama.timeout_secs);
            println!("  models = {}", config.ollama.models.join(", "));
            println!("  default_model = \"{}\"", config.ollama.default_model);
            println!();
            println!("[generation]");
            println!("  num_ctx = {}", config.generation.num_ctx);
            println!("  num_predict = {}", config.generation.num_predict);
            println!("  temperature = {}", config.generation.temperature);
            println!("  top_k = {}", config.generation.top_k);
            println!("  top_p = {}", config.generation.top_p);
            println!();
            println!("[chat]");
            println!("  max_messages = {}", config.chat.max_messages);
            println!();
            println!("[persona]");
            println!("  name = \"{}\"", config.persona.name);
            println!("  title = \"{}\"", config.persona.title);
        }

        // Get a specific key
        (Some(key), None) => {
            let value = get_config_value(&config, key)?;
            println!("{}", value);
        }

        // Set a specific key
        (Some(key), Some(value)) => {
            set_config_value(&mut config, key, value)?;
            config.validate()?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }

        _ => unreachable!(),
    }

    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "server.host" => Ok(config.server.host.clone()),
        "server.port" => Ok(config.server.port.to_string()),
        "ollama.base_url" => Ok(config.ollama.base_url.clone()),
        "ollama.timeout_secs" => Ok(config.ollama.timeout_secs.to_string()),
        "ollama.models" => Ok(config.ollama.models.join(",")),
        "ollama.default_model" => Ok(config.ollama.default_model.clone()),
        "generation.num_ctx" => Ok(config.generation.num_ctx.to_string()),
        "generation.num_predict" => Ok(config.generation.num_predict.to_string()),
        "generation.temperature" => Ok(config.generation.temperature.to_string()),
        "generation.top_k" => Ok(config.generation.top_k.to_string()),
        "generation.top_p" => Ok(config.generation.top_p.to_string()),
        "chat.max_messages" => Ok(config.chat.max_messages.to_string()),
        "persona.name" => Ok(config.persona.name.clone()),
        "persona.system_prompt" => Ok(config.persona.system_prompt.clone()),
        "persona.title" => Ok(config.persona.title.clone()),
        "persona.caption" => Ok(config.persona.caption.clone()),
        "persona.image_url" => Ok(config.persona.image_url.clone()),
        "persona.quick_stats" => Ok(config.persona.quick_stats.join(",")),
        "persona.input_placeholder" => Ok(config.persona.input_placeholder.clone()),
        "persona.thinking_message" => Ok(config.persona.thinking_message.clone()),
        "persona.hint" => Ok(config.persona.hint.clone()),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "server.host" => config.server.host = value.to_string(),
        "server.port" => config.server.port = value.parse()?,
        "ollama.base_url" => config.ollama.base_url = value.to_string(),
        "ollama.timeout_secs" => config.ollama.timeout_secs = value.parse()?,
        "ollama.models" => config.ollama.models = split_list(value),
        "ollama.default_model" => config.ollama.default_model = value.to_string(),
        "generation.num_ctx" => config.generation.num_ctx = value.parse()?,
        "generation.num_predict" => config.generation.num_predict = value.parse()?,
        "generation.temperature" => config.generation.temperature = value.parse()?,
        "generation.top_k" => config.generation.top_k = value.parse()?,
        "generation.top_p" => config.generation.top_p = value.parse()?,
        "chat.max_messages" => config.chat.max_messages = value.parse()?,
        "persona.name" => config.persona.name = value.to_string(),
        "persona.system_prompt" => config.persona.system_prompt = value.to_string(),
        "persona.title" => config.persona.title = value.to_string(),
        "persona.caption" => config.persona.caption = value.to_string(),
        "persona.image_url" => config.persona.image_url = value.to_string(),
        "persona.quick_stats" => config.persona.quick_stats = split_list(value),
        "persona.input_placeholder" => config.persona.input_placeholder = value.to_string(),
        "persona.thinking_message" => config.persona.thinking_message = value.to_string(),
        "persona.hint" => config.persona.hint = value.to_string(),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_through_keys() {
        let mut config = Config::default();

        set_config_value(&mut config, "generation.temperature", "0.25").unwrap();
        set_config_value(&mut config, "ollama.models", "phi, llama3.2 ,").unwrap();
        set_config_value(&mut config, "persona.name", "King James").unwrap();

        assert_eq!(get_config_value(&config, "generation.temperature").unwrap(), "0.25");
        assert_eq!(config.ollama.models, vec!["phi", "llama3.2"]);
        assert_eq!(get_config_value(&config, "persona.name").unwrap(), "King James");
    }

    #[test]
    fn bad_values_and_keys_are_errors() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "server.port", "eighty").is_err());
        assert!(set_config_value(&mut config, "server.colour", "red").is_err());
        assert!(get_config_value(&config, "nope").is_err());
    }

    #[test]
    fn default_model_outside_list_fails_validation() {
        let mut config = Config::default();
        set_config_value(&mut config, "ollama.default_model", "gemma").unwrap();
        assert!(config.validate().is_err());
    }
}
