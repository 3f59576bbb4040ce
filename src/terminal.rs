use log::{debug, info};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cli::{parse_command, Command, HELP_TEXT};
use crate::errors::WidgetError;
use crate::escalation::{EscalationStage, EscalationView};
use crate::models::escalation::{EscalationForm, FormField};
use crate::render::{render_message, to_terminal, PreviewDisplay};
use crate::widget::{ChatWidget, WidgetEvent};

const HIDDEN_HINT: &str = "The chat panel is hidden. Type /toggle to open it.";

/// Turns widget events into terminal lines. While the panel is hidden,
/// conversation output is held back and flushed when it opens again.
pub struct TerminalView {
    open: bool,
    held: Vec<String>,
    last_stage: EscalationStage,
}

impl TerminalView {
    pub fn new(open: bool) -> Self {
        Self {
            open,
            held: Vec::new(),
            last_stage: EscalationStage::Idle,
        }
    }

    pub fn handle(&mut self, event: &WidgetEvent) -> Vec<String> {
        match event {
            WidgetEvent::PanelToggled(true) => {
                self.open = true;
                let mut out = vec!["[chat panel opened]".to_string()];
                out.append(&mut self.held);
                out
            }
            WidgetEvent::PanelToggled(false) => {
                self.open = false;
                vec!["[chat panel closed]".to_string()]
            }
            WidgetEvent::MessageAppended(message) => {
                self.show(to_terminal(&render_message(message)))
            }
            WidgetEvent::Alert(text) => vec![format!("⚠ {}", text)],
            WidgetEvent::EscalationChanged(view) => {
                let lines = self.escalation_lines(view);
                self.last_stage = view.stage;
                match lines {
                    Some(text) => self.show(text),
                    None => Vec::new(),
                }
            }
            WidgetEvent::PlaceholderRemoved | WidgetEvent::InputCleared => Vec::new(),
        }
    }

    fn show(&mut self, text: String) -> Vec<String> {
        if self.open {
            vec![text]
        } else {
            self.held.push(text);
            Vec::new()
        }
    }

    fn escalation_lines(&self, view: &EscalationView) -> Option<String> {
        let same_stage = view.stage == self.last_stage;
        match view.stage {
            EscalationStage::Idle => None,
            EscalationStage::Prompted => view
                .prompt
                .map(|p| format!("\x1b[1mAssistant:\x1b[22m\n{}\n  [/yes] [/no]", p)),
            EscalationStage::FormOpen => view.form.as_ref().map(|form| {
                if same_stage {
                    format_form_fields(form)
                } else {
                    format!(
                        "\x1b[1mSend to Helpdesk\x1b[22m\n{}\n  [/submit: {}] [/cancel]",
                        format_form_fields(form),
                        view.control.map(|c| c.label).unwrap_or("Send")
                    )
                }
            }),
            EscalationStage::Submitting | EscalationStage::Sending => {
                view.control.map(|c| c.label.to_string())
            }
            EscalationStage::PreviewOpen => view.preview.as_ref().map(|preview| {
                format!(
                    "{}\n  [/send: {}] [/cancel]",
                    format_preview(preview),
                    view.control.map(|c| c.label).unwrap_or("Send Email")
                )
            }),
        }
    }
}

fn format_form_fields(form: &EscalationForm) -> String {
    [
        FormField::Name,
        FormField::Surname,
        FormField::StudentId,
        FormField::Email,
    ]
    .iter()
    .map(|field| format!("  {}: {}", field.label(), form.get(*field)))
    .collect::<Vec<_>>()
    .join("\n")
}

fn format_preview(preview: &PreviewDisplay) -> String {
    to_terminal(&preview.to_html())
}

/// Runs the interactive session until stdin closes or the user quits.
pub async fn run(mut widget: ChatWidget, events: UnboundedReceiver<WidgetEvent>) -> io::Result<()> {
    let view = TerminalView::new(widget.is_panel_open());
    let printer = tokio::spawn(print_events(view, events));

    if !widget.is_panel_open() {
        println!("{}", HIDDEN_HINT);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_command(&line);
        debug!("Terminal command: {:?}", command);
        if command == Command::Quit {
            break;
        }
        match dispatch(&mut widget, command).await {
            Ok(Some(notice)) => println!("{}", notice),
            Ok(None) => {}
            Err(e) => println!("⚠ {}", e),
        }
    }

    info!("Session ended with {} messages", widget.messages().len());
    drop(widget);
    let _ = printer.await;
    Ok(())
}

/// Applies one command to the widget. Returns a notice for the terminal
/// that is not part of the conversation (hints, help, unknown commands).
async fn dispatch(widget: &mut ChatWidget, command: Command) -> Result<Option<String>, WidgetError> {
    let needs_panel = !matches!(
        command,
        Command::Toggle | Command::Close | Command::Help | Command::Empty | Command::Unknown(_)
    );
    if needs_panel && !widget.is_panel_open() {
        return Ok(Some(HIDDEN_HINT.to_string()));
    }

    let notice = match command {
        Command::Ask(text) => {
            widget.set_input(text);
            widget.submit_input().await;
            None
        }
        Command::Toggle => {
            widget.toggle_panel();
            None
        }
        Command::Close => {
            widget.close_panel();
            None
        }
        Command::Yes => {
            widget.accept_escalation()?;
            None
        }
        Command::No => {
            widget.decline_escalation()?;
            None
        }
        Command::Field(field, value) => {
            widget.set_form_field(field, &value)?;
            None
        }
        Command::Submit => {
            match widget.submit_escalation().await {
                // Already surfaced to the user as an alert.
                Err(WidgetError::Validation) | Err(WidgetError::Backend(_)) => {}
                other => other?,
            }
            None
        }
        Command::Send => {
            widget.send_email().await?;
            None
        }
        Command::Cancel => {
            widget.cancel_escalation()?;
            None
        }
        Command::Help => Some(HELP_TEXT.to_string()),
        Command::Unknown(name) => Some(format!("Unknown command '/{}'. Type /help.", name)),
        Command::Empty | Command::Quit => None,
    };
    Ok(notice)
}

async fn print_events(mut view: TerminalView, mut events: UnboundedReceiver<WidgetEvent>) {
    while let Some(event) = events.recv().await {
        let lines = view.handle(&event);
        if lines.is_empty() {
            continue;
        }
        let mut stdout = io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{}\n", line);
        }
        let _ = stdout.flush();
    }
}
