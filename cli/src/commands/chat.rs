//! Interactive chat command

use anyhow::Result;
use dialoguer::Select;
use kingchat_core::{ChatSession, Config, Role};
use std::io::{self, BufRead, Write};

/// A line typed at the prompt
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Message(&'a str),
    Clear,
    Model,
    History,
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/clear" => Input::Clear,
        "/model" => Input::Model,
        "/history" => Input::History,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Message(text),
    }
}

pub async fn execute(model: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let client = super::ollama_client(&config)?;
    let mut session = super::new_session(&config, model)?;

    print_header(&session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        // Print prompt
        print!("> ");
        stdout.flush()?;

        // Read user input
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Clear => {
                session.clear();
                println!("Chat cleared.");
            }
            Input::History => print_history(&session),
            Input::Model => select_model(&mut session, &config)?,
            Input::Unknown(cmd) => println!("Unknown command {}. Type /help for commands.", cmd),
            Input::Message(text) => {
                let name = session.persona().name.clone();
                let spinner = super::thinking_spinner(&session.persona().thinking_message)?;

                let mut streamed = String::new();
                let reply = session
                    .send(&client, text, |fragment| {
                        if streamed.is_empty() {
                            spinner.finish_and_clear();
                            print!("{}: ", name);
                        }
                        print!("{}", fragment);
                        let _ = io::stdout().flush();
                        streamed.push_str(fragment);
                    })
                    .await?;
                spinner.finish_and_clear();

                if streamed.is_empty() {
                    println!("{}: {}", name, reply);
                } else if reply != streamed {
                    // The stream broke off; the recorded reply is the error
                    println!();
                    println!("{}", reply);
                } else {
                    println!();
                }
                println!();
            }
        }
    }

    Ok(())
}

fn print_header(session: &ChatSession) {
    let persona = session.persona();
    println!("{}", persona.title);
    println!();
    println!("Quick Stats");
    for stat in &persona.quick_stats {
        println!("  - {}", stat);
    }
    println!();
    println!("Model: {}", session.model());
    println!("{}", persona.hint);
    println!("Type /help for commands, Ctrl+D to exit.");
    println!("---");
}

fn print_help() {
    println!("  /model    choose another model");
    println!("  /clear    clear the chat");
    println!("  /history  show the recent messages");
    println!("  /quit     exit");
}

fn print_history(session: &ChatSession) {
    let visible = session.history().visible();
    if visible.is_empty() {
        println!("No messages yet.");
        return;
    }
    for message in visible {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => session.persona().name.as_str(),
        };
        println!("{}: {}", speaker, message.content);
    }
}

fn select_model(session: &mut ChatSession, config: &Config) -> Result<()> {
    let models = &config.ollama.models;
    let current = models
        .iter()
        .position(|m| m == session.model())
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt("Select Model")
        .items(models)
        .default(current)
        .interact()?;

    session.select_model(&models[choice], models)?;
    println!("Using {}", session.model());
    Ok(())
}
