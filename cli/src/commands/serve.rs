use anyhow::Result;
use kingchat_core::Config;

pub async fn execute(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("Starting kingchat...");
    println!("Open http://{}:{} in your browser", config.server.host, config.server.port);
    println!("\nAPI endpoints:");
    println!("  GET  /              - Chat page");
    println!("  GET  /health        - Health check");
    println!("  GET  /api/session   - Session, models and recent messages");
    println!("  POST /api/chat      - Send a message (server-sent events)");
    println!("  POST /api/model     - Select model");
    println!("  POST /api/clear     - Clear chat");
    println!("\nPress Ctrl+C to stop.\n");

    kingchat_web::run_server(config).await?;

    Ok(())
}
