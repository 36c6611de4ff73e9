//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending a prompt
//! to the agent.

use crate::types::Reaction;

/// How to share the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareFormat {
    /// The plain-text transcript.
    Text,
    /// A link carrying the encoded transcript.
    Link,
}

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation.
    Clear,

    /// Share the conversation.
    Share(ShareFormat),

    /// Toggle a reaction on the n-th assistant reply (1-based).
    React(usize, Reaction),

    /// Print the transcript.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be submitted as a prompt.
///
/// # Examples
///
/// ```
/// # use weather_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/up 2").is_some());
/// assert!(parse_command("Will it rain in Leeds?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "share" => match argument.map(|s| s.to_lowercase()).as_deref() {
            Some("text") | None => ChatCommand::Share(ShareFormat::Text),
            Some("link") => ChatCommand::Share(ShareFormat::Link),
            Some(_) => ChatCommand::Invalid("/share expects 'text' or 'link'".to_string()),
        },
        "up" => parse_reaction(argument, Reaction::Up, "/up"),
        "down" => parse_reaction(argument, Reaction::Down, "/down"),
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_reaction(argument: Option<&str>, reaction: Reaction, name: &str) -> ChatCommand {
    match argument {
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => ChatCommand::React(n, reaction),
            _ => ChatCommand::Invalid(format!("{} expects a reply number starting at 1", name)),
        },
        None => ChatCommand::Invalid(format!("{} requires a reply number", name)),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear the conversation
  /share text            Print the conversation as plain text
  /share link            Print a link that reopens the conversation
  /up <n>                Toggle thumbs up on reply n
  /down <n>              Toggle thumbs down on reply n
  /history               Show the conversation with reply numbers
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /QUIT  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_share() {
        assert_eq!(
            parse_command("/share"),
            Some(ChatCommand::Share(ShareFormat::Text))
        );
        assert_eq!(
            parse_command("/share text"),
            Some(ChatCommand::Share(ShareFormat::Text))
        );
        assert_eq!(
            parse_command("/share LINK"),
            Some(ChatCommand::Share(ShareFormat::Link))
        );
        assert!(matches!(
            parse_command("/share fax"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_reactions() {
        assert_eq!(
            parse_command("/up 1"),
            Some(ChatCommand::React(1, Reaction::Up))
        );
        assert_eq!(
            parse_command("/down 3"),
            Some(ChatCommand::React(3, Reaction::Down))
        );
        assert!(matches!(parse_command("/up"), Some(ChatCommand::Invalid(_))));
        assert!(matches!(parse_command("/up 0"), Some(ChatCommand::Invalid(_))));
        assert!(matches!(
            parse_command("/down two"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_other_commands() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse_command("/forecast"),
            Some(ChatCommand::Invalid("Unknown command: /forecast".to_string()))
        );
    }

    #[test]
    fn non_commands_are_prompts() {
        assert_eq!(parse_command("What's the weather in Paris?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("and/or"), None);
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for command in ["/clear", "/share", "/up", "/down", "/history", "/help", "/quit"] {
            assert!(help.contains(command), "missing {command}");
        }
    }
}
