//! Text transformations applied before anything reaches the user.
//!
//! All backend and user text is HTML-escaped first; the markdown-lite
//! substitutions run on the escaped text so that characters introduced by
//! escaping are never reinterpreted as markup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

use crate::models::chat::ConversationMessage;
use crate::models::escalation::EmailPreview;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid literal regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid literal regex"));
// ASCII digits only; `\d` would also match other scripts' digits.
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[0-9]+\.\s+").expect("valid literal regex"));

pub const NO_SUBJECT: &str = "No subject";
pub const NO_BODY: &str = "No body";

/// Escapes the characters that would otherwise be parsed as markup in element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn format_message(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    let listed = NUMBERED_ITEM.replace_all(&italic, "• ");
    listed.replace('\n', "<br>")
}

pub fn render_message(message: &ConversationMessage) -> String {
    format!(
        "<strong>{}:</strong><br>{}",
        message.sender,
        format_message(&message.text)
    )
}

/// Returns the nested `body` when the generated body is itself a JSON object.
pub fn unwrap_email_body(raw: &str) -> Cow<'_, str> {
    if !raw.trim_start().starts_with('{') {
        return Cow::Borrowed(raw);
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.get("body") {
            Some(Value::String(inner)) if !inner.is_empty() => Cow::Owned(inner.clone()),
            Some(Value::Null) | Some(Value::Bool(false)) | None => Cow::Borrowed(raw),
            Some(Value::String(_)) => Cow::Borrowed(raw),
            Some(other) => Cow::Owned(other.to_string()),
        },
        _ => Cow::Borrowed(raw),
    }
}

/// Email preview fields ready for display. Every field is escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDisplay {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body: String,
}

impl PreviewDisplay {
    pub fn body_lines(&self) -> Vec<&str> {
        self.body.lines().collect()
    }

    pub fn to_html(&self) -> String {
        format!(
            "<strong>Email preview</strong><br>\
             <strong>To:</strong> {}<br>\
             <strong>Cc:</strong> {}<br>\
             <strong>Subject:</strong><br>{}<br>\
             <strong>Body:</strong><br>{}",
            self.to,
            self.cc,
            self.subject,
            self.body.replace('\n', "<br>")
        )
    }
}

pub fn display_preview(preview: &EmailPreview) -> PreviewDisplay {
    let subject = non_empty(preview.subject.as_deref()).unwrap_or(NO_SUBJECT);
    let body = non_empty(preview.body.as_deref()).unwrap_or(NO_BODY);
    let body = escape_html(&unwrap_email_body(body)).replace("\\n", "\n");

    PreviewDisplay {
        to: escape_html(preview.to.as_deref().unwrap_or_default()),
        cc: escape_html(preview.cc.as_deref().unwrap_or_default()),
        subject: escape_html(subject),
        body,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Converts formatted message markup into ANSI-styled terminal text.
pub fn to_terminal(html: &str) -> String {
    html.replace("<strong>", "\x1b[1m")
        .replace("</strong>", "\x1b[22m")
        .replace("<em>", "\x1b[3m")
        .replace("</em>", "\x1b[23m")
        .replace("<br>", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
