use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::RagBackend;
use crate::config::WidgetConfig;
use crate::conversation::Conversation;
use crate::errors::WidgetError;
use crate::escalation::{Cancelled, EscalationStage, EscalationState, EscalationView};
use crate::models::chat::ConversationMessage;
use crate::models::escalation::FormField;

pub const DECLINED_TEXT: &str = "Okay, if you need more help, just ask!";
pub const FORM_CANCELLED_TEXT: &str = "No problem, the message was not sent.";
pub const PREVIEW_CANCELLED_TEXT: &str = "Email cancelled. No email was sent.";
pub const EMAIL_SENT_TEXT: &str = "✅ Email sent.";

/// Everything the view needs to redraw, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    PanelToggled(bool),
    MessageAppended(ConversationMessage),
    PlaceholderRemoved,
    InputCleared,
    Alert(String),
    EscalationChanged(EscalationView),
}

/// Chat panel controller: owns the message list, the input buffer and the
/// escalation flow, and forwards questions to the backend.
pub struct ChatWidget {
    backend: Arc<dyn RagBackend>,
    send_delay: Duration,
    panel_open: bool,
    input: String,
    conversation: Conversation,
    escalation: EscalationState,
    events: UnboundedSender<WidgetEvent>,
}

impl ChatWidget {
    pub fn new(
        backend: Arc<dyn RagBackend>,
        config: &WidgetConfig,
    ) -> (Self, UnboundedReceiver<WidgetEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let widget = Self {
            backend,
            send_delay: config.send_delay,
            panel_open: config.start_open,
            input: String::new(),
            conversation: Conversation::new(),
            escalation: EscalationState::default(),
            events,
        };
        (widget, rx)
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        debug!("Chat panel {}", if self.panel_open { "opened" } else { "closed" });
        self.emit(WidgetEvent::PanelToggled(self.panel_open));
        self.panel_open
    }

    pub fn close_panel(&mut self) {
        if self.panel_open {
            self.toggle_panel();
        }
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Submits whatever is in the input buffer, like pressing Enter.
    pub async fn submit_input(&mut self) -> bool {
        let text = self.input.clone();
        self.submit_question(&text).await
    }

    /// Sends a question to the backend and renders the outcome.
    ///
    /// Returns `false` without touching anything when `text` is blank.
    pub async fn submit_question(&mut self, text: &str) -> bool {
        let question = text.trim();
        if question.is_empty() {
            return false;
        }

        self.append(ConversationMessage::you(question));
        self.input.clear();
        self.emit(WidgetEvent::InputCleared);
        let placeholder = self.conversation.push_placeholder().clone();
        self.emit(WidgetEvent::MessageAppended(placeholder));

        info!("Asking backend: {}", preview_text(question));
        let result = self.backend.chat(question).await;

        if self.conversation.remove_placeholder() {
            self.emit(WidgetEvent::PlaceholderRemoved);
        }

        match result {
            Ok(answer) => {
                self.append(ConversationMessage::assistant(answer.as_str()));
                self.escalation.offer(question, &answer);
                self.emit_escalation();
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.append(ConversationMessage::assistant(format!("❌ Error: {}", e)));
            }
        }
        true
    }

    pub fn accept_escalation(&mut self) -> Result<(), WidgetError> {
        self.escalation.accept()?;
        self.emit_escalation();
        Ok(())
    }

    pub fn decline_escalation(&mut self) -> Result<(), WidgetError> {
        self.escalation.decline()?;
        self.emit_escalation();
        self.append(ConversationMessage::assistant(DECLINED_TEXT));
        Ok(())
    }

    pub fn set_form_field(&mut self, field: FormField, value: &str) -> Result<(), WidgetError> {
        self.escalation.set_field(field, value)?;
        self.emit_escalation();
        Ok(())
    }

    /// Validates the form and asks the backend for an email draft.
    ///
    /// Validation and backend failures are surfaced as alerts and leave the
    /// form open; the error is also returned to the caller.
    pub async fn submit_escalation(&mut self) -> Result<(), WidgetError> {
        let request = match self.escalation.begin_submit() {
            Ok(request) => request,
            Err(WidgetError::Validation) => {
                self.alert(WidgetError::Validation.to_string());
                return Err(WidgetError::Validation);
            }
            Err(e) => return Err(e),
        };
        self.emit_escalation();

        match self.backend.escalate(&request).await {
            Ok(preview) => {
                self.escalation.submit_succeeded(preview)?;
                self.emit_escalation();
                Ok(())
            }
            Err(e) => {
                warn!("Escalation request failed: {}", e);
                self.escalation.submit_failed()?;
                self.emit_escalation();
                self.alert(format!("Error sending escalation: {}", e));
                Err(e.into())
            }
        }
    }

    pub fn cancel_escalation(&mut self) -> Result<(), WidgetError> {
        let cancelled = self.escalation.cancel()?;
        self.emit_escalation();
        let text = match cancelled {
            Cancelled::Form => FORM_CANCELLED_TEXT,
            Cancelled::Preview => PREVIEW_CANCELLED_TEXT,
        };
        self.append(ConversationMessage::assistant(text));
        Ok(())
    }

    /// Simulated send: waits the configured delay, then reports success.
    /// No request leaves the process.
    pub async fn send_email(&mut self) -> Result<(), WidgetError> {
        self.escalation.begin_send()?;
        self.emit_escalation();

        tokio::time::sleep(self.send_delay).await;

        self.escalation.finish_send()?;
        self.emit_escalation();
        info!("Helpdesk email marked as sent (simulated)");
        self.append(ConversationMessage::assistant(EMAIL_SENT_TEXT));
        Ok(())
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        self.conversation.messages()
    }

    pub fn escalation_stage(&self) -> EscalationStage {
        self.escalation.stage()
    }

    pub fn escalation_view(&self) -> EscalationView {
        self.escalation.view()
    }

    fn append(&mut self, message: ConversationMessage) {
        let message = self.conversation.push(message).clone();
        debug!(
            "[{}] {} message #{} ({} chars)",
            message.timestamp.format("%H:%M:%S"),
            message.sender,
            self.conversation.len(),
            message.text.chars().count()
        );
        self.emit(WidgetEvent::MessageAppended(message));
    }

    fn alert(&mut self, text: String) {
        self.emit(WidgetEvent::Alert(text));
    }

    fn emit_escalation(&self) {
        self.emit(WidgetEvent::EscalationChanged(self.escalation.view()));
    }

    fn emit(&self, event: WidgetEvent) {
        // The view may have gone away; the widget keeps working without it.
        let _ = self.events.send(event);
    }
}

fn preview_text(text: &str) -> String {
    let mut out: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        out.push_str("...");
    }
    out
}
