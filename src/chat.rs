// Terminal front end: the same session the page drives, fed from stdin.

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::assistant::Assistant;
use crate::session::{ClientEvent, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    Next,
    Previous,
    Jump(usize),
    List,
    Help,
    Quit,
    Ask(String),
    Invalid(String),
    Empty,
}

/// `/jump` takes the 1-based position shown in the listing.
pub fn parse_line(line: &str) -> TerminalCommand {
    let line = line.trim();
    if line.is_empty() {
        return TerminalCommand::Empty;
    }
    if !line.starts_with('/') {
        return TerminalCommand::Ask(line.to_string());
    }

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("/next"), None) => TerminalCommand::Next,
        (Some("/prev"), None) | (Some("/previous"), None) => TerminalCommand::Previous,
        (Some("/list"), None) => TerminalCommand::List,
        (Some("/help"), None) => TerminalCommand::Help,
        (Some("/quit"), None) | (Some("/exit"), None) => TerminalCommand::Quit,
        (Some("/jump"), Some(arg)) => match arg.parse::<usize>() {
            Ok(position) if position >= 1 => TerminalCommand::Jump(position - 1),
            _ => TerminalCommand::Invalid(format!("not a position: {}", arg)),
        },
        _ => TerminalCommand::Invalid(format!("unknown command: {}", line)),
    }
}

const HELP: &str = "Commands: /next, /prev, /jump <n>, /list, /help, /quit. Anything else is a question for the assistant.";

fn print_current<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    let snapshot = session.snapshot();
    writeln!(
        out,
        "\n[{}] {} - {} ({})",
        snapshot.view.counter, snapshot.view.title, snapshot.view.category, snapshot.view.date
    )?;
    writeln!(out, "    {}", snapshot.view.description)?;
    if let Some(greeting) = snapshot.transcript.first() {
        writeln!(out, "Assistant: {}", greeting.text)?;
    }
    Ok(())
}

/// Runs the chat loop until `/quit` or end of input.
pub async fn run_terminal_chat<R, W>(mut session: Session, assistant: &Assistant, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(remote = assistant.remote_enabled(), "Starting terminal chat");
    writeln!(out, "{} - Creative Portfolio", session.catalog().owner())?;
    writeln!(out, "{}", HELP)?;
    print_current(&session, out)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let command = parse_line(&line);
        debug!(?command, "Terminal command");
        match command {
            TerminalCommand::Empty => {}
            TerminalCommand::Quit => break,
            TerminalCommand::Help => writeln!(out, "{}", HELP)?,
            TerminalCommand::List => {
                let current = session.carousel().current_index();
                for (i, item) in session.catalog().items().iter().enumerate() {
                    let marker = if i == current { "*" } else { " " };
                    writeln!(out, "{} {}. {} ({})", marker, i + 1, item.title, item.category)?;
                }
            }
            TerminalCommand::Next => {
                session.next();
                print_current(&session, out)?;
            }
            TerminalCommand::Previous => {
                session.previous();
                print_current(&session, out)?;
            }
            TerminalCommand::Jump(index) => match session.jump_to(index) {
                Ok(()) => print_current(&session, out)?,
                Err(e) => writeln!(out, "{}", e)?,
            },
            TerminalCommand::Invalid(message) => writeln!(out, "{} (try /help)", message)?,
            TerminalCommand::Ask(text) => {
                let item = session.current_item().clone();
                let Some(pending) = session.apply(ClientEvent::Chat { text })? else {
                    continue;
                };
                let reply = assistant.respond(&pending.user_text, &item, &pending.context).await;
                let entry = session.finish_reply(pending, reply);
                writeln!(out, "Assistant: {}", entry.text)?;
            }
        }
    }

    writeln!(out, "Goodbye!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{FallbackResponder, STYLE_RESPONSE, TECHNIQUE_RESPONSE};
    use crate::catalog::Catalog;
    use std::sync::Arc;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  "), TerminalCommand::Empty);
        assert_eq!(parse_line("/next"), TerminalCommand::Next);
        assert_eq!(parse_line("/prev"), TerminalCommand::Previous);
        assert_eq!(parse_line("/jump 3"), TerminalCommand::Jump(2));
        assert_eq!(parse_line("/quit"), TerminalCommand::Quit);
        assert_eq!(parse_line("what's your style?"), TerminalCommand::Ask("what's your style?".to_string()));
        assert!(matches!(parse_line("/jump 0"), TerminalCommand::Invalid(_)));
        assert!(matches!(parse_line("/jump x"), TerminalCommand::Invalid(_)));
        assert!(matches!(parse_line("/dance"), TerminalCommand::Invalid(_)));
    }

    #[tokio::test]
    async fn test_terminal_session() {
        let session = Session::new(Arc::new(Catalog::builtin()));
        let assistant = Assistant::offline("Kilah Oliver", FallbackResponder::seeded("Kilah", 9));
        let input: &[u8] = b"how do you do this\n/next\nwhat's your style\n/jump 9\n/quit\nnever read\n";
        let mut out = Vec::new();

        run_terminal_chat(session, &assistant, input, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(&format!("Assistant: {}", TECHNIQUE_RESPONSE)));
        assert!(printed.contains("Now viewing \"Raleigh Event\" - Event Coverage."));
        assert!(printed.contains(&format!("Assistant: {}", STYLE_RESPONSE)));
        assert!(printed.contains("item index 8 is out of range for a catalog of 7"));
        assert!(printed.ends_with("Goodbye!\n"));
    }
}
