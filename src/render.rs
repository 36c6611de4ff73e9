//! Terminal rendering for the chat binary.
//!
//! Replies arrive as the full text so far, so the renderer remembers how much it has already
//! printed and writes only the new tail.

use std::io::{self, Write};

use crate::types::{Message, Reaction, Role};

/// ANSI escape code for dim text (used for timestamps and hints).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the agent label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for thumbs up).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors and thumbs down).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Called before the first fragment of a reply.
    fn start_reply(&mut self);

    /// Show the reply as it stands; `text` is the full reply so far.
    fn print_reply(&mut self, text: &str);

    /// Called when the reply stream ends, successfully or not.
    fn finish_reply(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print one transcript entry; `number` is the reply's position among assistant messages.
    fn print_message(&mut self, number: Option<usize>, message: &Message);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    use_color: bool,
    printed: String,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), use_color)
    }

    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            printed: String::new(),
        }
    }

    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// The part of `text` not yet printed.
///
/// `None` when `text` does not extend `printed`.
fn unseen<'a>(printed: &str, text: &'a str) -> Option<&'a str> {
    text.strip_prefix(printed)
}

impl Renderer for PlainTextRenderer {
    fn start_reply(&mut self) {
        self.printed.clear();
        let label = self.styled(ANSI_CYAN, Role::Assistant.speaker());
        self.write(&format!("{label}: "));
    }

    fn print_reply(&mut self, text: &str) {
        match unseen(&self.printed, text) {
            Some(tail) => self.write(tail),
            None => {
                self.write("\n");
                self.write(text);
            }
        }
        self.printed.clear();
        self.printed.push_str(text);
    }

    fn finish_reply(&mut self) {
        self.printed.clear();
        self.write("\n");
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write(&format!("{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.write(&format!("{info}\n"));
    }

    fn print_message(&mut self, number: Option<usize>, message: &Message) {
        let speaker = match message.role {
            Role::User => message.role.speaker().to_string(),
            Role::Assistant => self.styled(ANSI_CYAN, message.role.speaker()),
        };
        let number = number.map(|n| format!("[{n}] ")).unwrap_or_default();
        let reaction = match message.reaction {
            Some(Reaction::Up) => format!(" {}", self.styled(ANSI_GREEN, "(+1)")),
            Some(Reaction::Down) => format!(" {}", self.styled(ANSI_RED, "(-1)")),
            None => String::new(),
        };
        let time = message
            .timestamp
            .format(time::macros::format_description!("[hour]:[minute]"))
            .unwrap_or_default();
        let time = self.styled(ANSI_DIM, &time);
        self.write(&format!(
            "{number}{speaker} {time}: {}{reaction}\n",
            message.content
        ));
    }
}
