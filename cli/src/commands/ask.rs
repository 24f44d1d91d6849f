use anyhow::Result;
use kingchat_core::Config;

pub async fn execute(prompt: &str, model: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let client = super::ollama_client(&config)?;
    let mut session = super::new_session(&config, model)?;

    let spinner = super::thinking_spinner(&session.persona().thinking_message)?;
    let reply = session.send(&client, prompt, |_| {}).await?;
    spinner.finish_and_clear();

    println!("{}", reply);
    Ok(())
}
