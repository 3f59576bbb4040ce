use clap::Parser;

use crate::models::escalation::FormField;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the RAG helpdesk backend (e.g., http://127.0.0.1:8000)
    #[arg(long, env = "HELPDESK_BASE_URL", default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Skip the /health check against the backend on startup.
    #[arg(long, env = "HELPDESK_SKIP_HEALTH_CHECK", default_value = "false")]
    pub skip_health_check: bool,

    // --- Widget Args ---
    /// Delay in milliseconds before a previewed email is reported as sent.
    #[arg(long, env = "HELPDESK_SEND_DELAY_MS", default_value = "900")]
    pub send_delay_ms: u64,

    /// Open the chat panel on startup instead of starting hidden.
    #[arg(long, env = "HELPDESK_START_OPEN", default_value = "false")]
    pub start_open: bool,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

/// One line of terminal input, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Toggle,
    Close,
    Yes,
    No,
    Field(FormField, String),
    Submit,
    Send,
    Cancel,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    if let Some(question) = trimmed.strip_prefix("//") {
        return Command::Ask(format!("/{}", question));
    }

    let rest = match trimmed.strip_prefix('/') {
        Some(rest) => rest,
        None => return Command::Ask(trimmed.to_string()),
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or_default().to_string();

    match name.as_str() {
        "toggle" => Command::Toggle,
        "close" => Command::Close,
        "yes" | "y" => Command::Yes,
        "no" | "n" => Command::No,
        "name" => Command::Field(FormField::Name, arg),
        "surname" => Command::Field(FormField::Surname, arg),
        "id" => Command::Field(FormField::StudentId, arg),
        "email" => Command::Field(FormField::Email, arg),
        "submit" => Command::Submit,
        "send" => Command::Send,
        "cancel" => Command::Cancel,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

pub const HELP_TEXT: &str = "\
Type a question and press Enter to ask the helpdesk assistant.
Start a question with // if it begins with a slash (//etc/hosts asks /etc/hosts).
  /toggle            show or hide the chat panel
  /close             hide the chat panel
  /yes, /no          answer the escalation prompt
  /name <value>      set first name on the escalation form
  /surname <value>   set last name
  /id <value>        set student ID
  /email <value>     set email (optional)
  /submit            submit the escalation form
  /send              send the previewed email
  /cancel            cancel the open form or preview
  /quit              leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_command("  How do I enrol?  "),
            Command::Ask("How do I enrol?".to_string())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(parse_command("   \t"), Command::Empty);
    }

    #[test]
    fn field_commands_keep_inner_whitespace() {
        assert_eq!(
            parse_command("/name  Anna Maria "),
            Command::Field(FormField::Name, "Anna Maria".to_string())
        );
        assert_eq!(
            parse_command("/email"),
            Command::Field(FormField::Email, String::new())
        );
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/YES"), Command::Yes);
        assert_eq!(parse_command("/Toggle"), Command::Toggle);
    }

    #[test]
    fn double_slash_asks_a_question_starting_with_slash() {
        assert_eq!(
            parse_command("//etc/hosts permissions?"),
            Command::Ask("/etc/hosts permissions?".to_string())
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(parse_command("/frobnicate now"), Command::Unknown("frobnicate".to_string()));
    }

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["helpdesk-chat"]);
        assert_eq!(args.send_delay_ms, 900);
        assert!(!args.start_open);
    }
}
