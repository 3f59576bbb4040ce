use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Surname,
    StudentId,
    Email,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "First name",
            FormField::Surname => "Last name",
            FormField::StudentId => "Student ID",
            FormField::Email => "Email (optional)",
        }
    }
}

/// Raw contents of the escalation form as the user typed them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EscalationForm {
    pub name: String,
    pub surname: String,
    pub student_id: String,
    pub email: String,
}

impl EscalationForm {
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Surname => self.surname = value,
            FormField::StudentId => self.student_id = value,
            FormField::Email => self.email = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Surname => &self.surname,
            FormField::StudentId => &self.student_id,
            FormField::Email => &self.email,
        }
    }

    pub fn missing_required(&self) -> Vec<FormField> {
        [FormField::Name, FormField::Surname, FormField::StudentId]
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationRequest {
    pub query: String,
    pub name: String,
    pub surname: String,
    pub student_id: String,
    pub email: Option<String>,
    pub rag_answer: String,
}

impl EscalationRequest {
    /// Builds a request from the form, or returns the required fields left blank.
    pub fn from_form(
        form: &EscalationForm,
        query: &str,
        rag_answer: &str,
    ) -> Result<Self, Vec<FormField>> {
        let missing = form.missing_required();
        if !missing.is_empty() {
            return Err(missing);
        }

        let email = Some(form.email.trim().to_string()).filter(|e| !e.is_empty());
        Ok(Self {
            query: query.to_string(),
            name: form.name.trim().to_string(),
            surname: form.surname.trim().to_string(),
            student_id: form.student_id.trim().to_string(),
            email,
            rag_answer: rag_answer.to_string(),
        })
    }

    pub fn payload(&self) -> EscalatePayload<'_> {
        EscalatePayload {
            query: &self.query,
            name: &self.name,
            surname: &self.surname,
            student_id: &self.student_id,
            email: self.email.as_deref().unwrap_or(""),
            rag_answer: &self.rag_answer,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EscalatePayload<'a> {
    pub query: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub student_id: &'a str,
    pub email: &'a str,
    pub rag_answer: &'a str,
}

/// Generated email as returned by the escalation endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailPreview {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> EscalationForm {
        EscalationForm {
            name: " Ada ".into(),
            surname: "Lovelace".into(),
            student_id: "123456".into(),
            email: "   ".into(),
        }
    }

    #[test]
    fn request_trims_fields_and_drops_blank_email() {
        let req = EscalationRequest::from_form(&filled(), "q", "a").unwrap();
        assert_eq!(req.name, "Ada");
        assert_eq!(req.email, None);
    }

    #[test]
    fn whitespace_only_required_field_is_missing() {
        let mut form = filled();
        form.set(FormField::StudentId, "  ");
        assert_eq!(
            EscalationRequest::from_form(&form, "q", "a").unwrap_err(),
            vec![FormField::StudentId]
        );
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let mut form = filled();
        form.set(FormField::Email, "ada@uni.example");
        let req = EscalationRequest::from_form(&form, "How?", "Like this").unwrap();
        let value = serde_json::to_value(req.payload()).unwrap();
        assert_eq!(value["student_id"], "123456");
        assert_eq!(value["email"], "ada@uni.example");
        assert_eq!(value["rag_answer"], "Like this");
        assert_eq!(value["query"], "How?");
    }

    #[test]
    fn absent_email_is_sent_as_empty_string() {
        let req = EscalationRequest::from_form(&filled(), "q", "a").unwrap();
        let value = serde_json::to_value(req.payload()).unwrap();
        assert_eq!(value["email"], "");
    }

    #[test]
    fn preview_tolerates_missing_and_null_fields() {
        let preview: EmailPreview =
            serde_json::from_str(r#"{"to": "help@uni.example", "cc": null}"#).unwrap();
        assert_eq!(preview.to.as_deref(), Some("help@uni.example"));
        assert_eq!(preview.cc, None);
        assert_eq!(preview.body, None);
    }
}
