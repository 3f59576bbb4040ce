//! Helpdesk escalation flow.
//!
//! `Idle -> Prompted -> FormOpen -> Submitting -> PreviewOpen -> Sending -> Idle`
//!
//! Every transition is guarded: calling one from the wrong stage returns
//! [`WidgetError::InvalidState`] and leaves the state untouched.

use std::fmt;
use std::mem;

use crate::errors::WidgetError;
use crate::models::escalation::{EmailPreview, EscalationForm, EscalationRequest, FormField};
use crate::render::{display_preview, PreviewDisplay};

pub const PROMPT_TEXT: &str =
    "Would you like to send an email to the helpdesk for more information?";
pub const SEND_LABEL: &str = "Send";
pub const SEND_EMAIL_LABEL: &str = "Send Email";
pub const SENDING_LABEL: &str = "Sending...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscalationStage {
    Idle,
    Prompted,
    FormOpen,
    Submitting,
    PreviewOpen,
    Sending,
}

impl fmt::Display for EscalationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscalationStage::Idle => "no escalation is open",
            EscalationStage::Prompted => "the escalation prompt is open",
            EscalationStage::FormOpen => "the escalation form is open",
            EscalationStage::Submitting => "the escalation is being submitted",
            EscalationStage::PreviewOpen => "the email preview is open",
            EscalationStage::Sending => "the email is being sent",
        };
        write!(f, "{}", name)
    }
}

/// A button in the form or preview: whether it is clickable and its caption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Control {
    pub enabled: bool,
    pub label: &'static str,
}

impl Control {
    fn ready(label: &'static str) -> Self {
        Self { enabled: true, label }
    }

    fn busy() -> Self {
        Self {
            enabled: false,
            label: SENDING_LABEL,
        }
    }
}

/// The question and answer an escalation refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EscalationState {
    #[default]
    Idle,
    Prompted {
        topic: Topic,
    },
    FormOpen {
        topic: Topic,
        form: EscalationForm,
    },
    Submitting {
        topic: Topic,
        form: EscalationForm,
    },
    PreviewOpen {
        preview: EmailPreview,
    },
    Sending {
        preview: EmailPreview,
    },
}

/// What a closed escalation was cancelled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cancelled {
    Form,
    Preview,
}

impl EscalationState {
    pub fn stage(&self) -> EscalationStage {
        match self {
            EscalationState::Idle => EscalationStage::Idle,
            EscalationState::Prompted { .. } => EscalationStage::Prompted,
            EscalationState::FormOpen { .. } => EscalationStage::FormOpen,
            EscalationState::Submitting { .. } => EscalationStage::Submitting,
            EscalationState::PreviewOpen { .. } => EscalationStage::PreviewOpen,
            EscalationState::Sending { .. } => EscalationStage::Sending,
        }
    }

    /// Offers escalation for a fresh answer, replacing anything still open.
    pub fn offer(&mut self, question: &str, answer: &str) {
        *self = EscalationState::Prompted {
            topic: Topic {
                question: question.to_string(),
                answer: answer.to_string(),
            },
        };
    }

    pub fn accept(&mut self) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::Prompted { topic } => {
                *self = EscalationState::FormOpen {
                    topic,
                    form: EscalationForm::default(),
                };
                Ok(())
            }
            other => self.reject(other, "open the escalation form"),
        }
    }

    pub fn decline(&mut self) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::Prompted { .. } => Ok(()),
            other => self.reject(other, "decline escalation"),
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), WidgetError> {
        match self {
            EscalationState::FormOpen { form, .. } => {
                form.set(field, value);
                Ok(())
            }
            _ => Err(self.invalid("edit the escalation form")),
        }
    }

    /// Validates the form and moves to `Submitting`, returning the request to send.
    pub fn begin_submit(&mut self) -> Result<EscalationRequest, WidgetError> {
        match self {
            EscalationState::FormOpen { topic, form } => {
                let request = EscalationRequest::from_form(form, &topic.question, &topic.answer)
                    .map_err(|_| WidgetError::Validation)?;
                let topic = topic.clone();
                let form = mem::take(form);
                *self = EscalationState::Submitting { topic, form };
                Ok(request)
            }
            _ => Err(self.invalid("submit the escalation form")),
        }
    }

    pub fn submit_failed(&mut self) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::Submitting { topic, form } => {
                *self = EscalationState::FormOpen { topic, form };
                Ok(())
            }
            other => self.reject(other, "reopen the escalation form"),
        }
    }

    pub fn submit_succeeded(&mut self, preview: EmailPreview) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::Submitting { .. } => {
                *self = EscalationState::PreviewOpen { preview };
                Ok(())
            }
            other => self.reject(other, "show the email preview"),
        }
    }

    pub fn cancel(&mut self) -> Result<Cancelled, WidgetError> {
        match mem::take(self) {
            EscalationState::FormOpen { .. } => Ok(Cancelled::Form),
            EscalationState::PreviewOpen { .. } => Ok(Cancelled::Preview),
            other => {
                *self = other;
                Err(self.invalid("cancel"))
            }
        }
    }

    pub fn begin_send(&mut self) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::PreviewOpen { preview } => {
                *self = EscalationState::Sending { preview };
                Ok(())
            }
            other => self.reject(other, "send the email"),
        }
    }

    pub fn finish_send(&mut self) -> Result<(), WidgetError> {
        match mem::take(self) {
            EscalationState::Sending { .. } => Ok(()),
            other => self.reject(other, "finish sending"),
        }
    }

    pub fn view(&self) -> EscalationView {
        let mut view = EscalationView {
            stage: self.stage(),
            prompt: None,
            form: None,
            control: None,
            preview: None,
        };
        match self {
            EscalationState::Idle => {}
            EscalationState::Prompted { .. } => view.prompt = Some(PROMPT_TEXT),
            EscalationState::FormOpen { form, .. } => {
                view.form = Some(form.clone());
                view.control = Some(Control::ready(SEND_LABEL));
            }
            EscalationState::Submitting { form, .. } => {
                view.form = Some(form.clone());
                view.control = Some(Control::busy());
            }
            EscalationState::PreviewOpen { preview } => {
                view.preview = Some(display_preview(preview));
                view.control = Some(Control::ready(SEND_EMAIL_LABEL));
            }
            EscalationState::Sending { preview } => {
                view.preview = Some(display_preview(preview));
                view.control = Some(Control::busy());
            }
        }
        view
    }

    fn invalid(&self, action: &'static str) -> WidgetError {
        WidgetError::InvalidState {
            action,
            stage: self.stage(),
        }
    }

    fn reject<T>(&mut self, previous: EscalationState, action: &'static str) -> Result<T, WidgetError> {
        *self = previous;
        Err(self.invalid(action))
    }
}

/// Read-only snapshot of the escalation UI handed to the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationView {
    pub stage: EscalationStage,
    pub prompt: Option<&'static str>,
    pub form: Option<EscalationForm>,
    pub control: Option<Control>,
    pub preview: Option<PreviewDisplay>,
}
