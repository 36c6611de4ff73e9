//! Interactive chat with the weather agent.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the hosted deployment
//! weather-chat
//!
//! # Talk to a local agent server
//! weather-chat --base-url http://localhost:4111
//!
//! # Disable colors (useful for piping output)
//! weather-chat --no-color
//! ```
//!
//! # Logging
//!
//! Library logs go to stderr at `warn`; set `RUST_LOG=weather_chat=debug` for more.
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/clear` - Clear the conversation
//! - `/share text|link` - Share the conversation
//! - `/up <n>`, `/down <n>` - React to reply n
//! - `/history` - Show the conversation
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use weather_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, ShareFormat, help_text,
    init_logging, parse_command,
};
use weather_chat::export::{share_link, share_text};
use weather_chat::{Conversation, Reaction, TurnOutcome, WeatherAgent};

/// Main entry point for the weather-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("weather-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    init_logging(config.use_color);

    let agent = WeatherAgent::new(config.agent.clone())?;
    let conversation = Conversation::new(agent);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Weather Chat ({})", config.agent.base_url);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            conversation.reset();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::History => {
                            print_history(&conversation, &mut renderer);
                        }
                        ChatCommand::Share(format) => {
                            share(&conversation, &config, format, &mut renderer);
                        }
                        ChatCommand::React(n, reaction) => {
                            react(&conversation, n, reaction, &mut renderer);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                send(&conversation, line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

async fn send(
    conversation: &Conversation<WeatherAgent>,
    prompt: &str,
    renderer: &mut PlainTextRenderer,
) {
    let mut started = false;
    let outcome = conversation
        .submit_with_progress(prompt, |text| {
            if !started {
                renderer.start_reply();
                started = true;
            }
            renderer.print_reply(text);
        })
        .await;
    if started {
        renderer.finish_reply();
    }
    match outcome {
        TurnOutcome::Completed { reply_id: None } => {
            renderer.print_info("(the agent sent no text)");
        }
        TurnOutcome::Completed { .. } | TurnOutcome::Skipped(_) => {}
        TurnOutcome::Failed(_) => {
            if let Some(error) = conversation.last_error() {
                renderer.print_error(&error);
            }
            conversation.dismiss_error();
        }
    }
}

fn print_history(conversation: &Conversation<WeatherAgent>, renderer: &mut PlainTextRenderer) {
    let snapshot = conversation.snapshot();
    if snapshot.messages.is_empty() {
        renderer.print_info("No messages yet.");
        return;
    }
    let mut replies = 0;
    for message in &snapshot.messages {
        let number = if message.is_assistant() {
            replies += 1;
            Some(replies)
        } else {
            None
        };
        renderer.print_message(number, message);
    }
}

fn share(
    conversation: &Conversation<WeatherAgent>,
    config: &ChatConfig,
    format: ShareFormat,
    renderer: &mut PlainTextRenderer,
) {
    if !conversation.has_messages() {
        renderer.print_info("Nothing to share yet.");
        return;
    }
    let messages = conversation.snapshot().messages;
    match format {
        ShareFormat::Text => renderer.print_info(&share_text(&messages)),
        ShareFormat::Link => match share_link(&config.share_origin, &messages) {
            Ok(url) => renderer.print_info(url.as_str()),
            Err(err) => renderer.print_error(&format!("Failed to build share link: {}", err)),
        },
    }
}

fn react(
    conversation: &Conversation<WeatherAgent>,
    n: usize,
    reaction: Reaction,
    renderer: &mut PlainTextRenderer,
) {
    let transcript = conversation.transcript();
    let Some(id) = transcript
        .assistant_messages()
        .nth(n - 1)
        .map(|m| m.id.clone())
    else {
        renderer.print_error(&format!("No reply number {n}"));
        return;
    };
    match conversation.react(&id, reaction) {
        Some(Some(Reaction::Up)) => renderer.print_info(&format!("Reply {n}: thumbs up")),
        Some(Some(Reaction::Down)) => renderer.print_info(&format!("Reply {n}: thumbs down")),
        Some(None) => renderer.print_info(&format!("Reply {n}: reaction cleared")),
        None => renderer.print_error(&format!("No reply number {n}")),
    }
}
