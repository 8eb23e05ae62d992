//! `POST /submit`: the browser form endpoint.
//!
//! Accepts `multipart/form-data` with the text fields `from`, `to`,
//! `subject`, `tbody`, `cc`, `bcc`, `provider` and up to
//! [`MAX_ATTACHMENTS`] files under `attachments`.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use axum_helpers::AppError;
use mail_dispatch::{Attachment, DeliveryResult, Message, Provider};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::dispatch_error;
use crate::state::AppState;

pub const MAX_ATTACHMENTS: usize = 3;
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Room for the text fields and multipart framing on top of the files.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .layer(DefaultBodyLimit::max(
            MAX_ATTACHMENTS * MAX_ATTACHMENT_BYTES + FORM_OVERHEAD_BYTES,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub provider: Provider,
    #[serde(flatten)]
    pub delivery: DeliveryResult,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub credentials_unavailable: bool,
}

/// Text fields of the form, as submitted.
#[derive(Debug, Default)]
struct SubmitForm {
    from: Option<String>,
    to: String,
    subject: String,
    tbody: String,
    cc: Option<String>,
    bcc: Option<String>,
    provider: Option<String>,
    attachments: Vec<Attachment>,
}

impl SubmitForm {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "from" => self.from = Some(value),
            "to" => self.to = value,
            "subject" => self.subject = value,
            "tbody" => self.tbody = value,
            "cc" => self.cc = Some(value),
            "bcc" => self.bcc = Some(value),
            "provider" => self.provider = Some(value),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    /// Provider token, `gmail` when absent or blank.
    fn provider_token(&self) -> String {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("gmail")
            .to_ascii_lowercase()
    }

    fn into_message(self) -> Message {
        let mut message = Message::new(self.to, self.subject, self.tbody);
        message.from = self.from;
        message.cc = self.cc;
        message.bcc = self.bcc;
        message.attachments = self.attachments;
        message
    }
}

async fn read_form(mut multipart: Multipart) -> Result<SubmitForm, AppError> {
    let mut form = SubmitForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name != "attachments" {
            let value = field.text().await?;
            form.set(&name, value);
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let content = field.bytes().await?;

        // Browsers send an empty part when no file was picked.
        if filename.is_empty() && content.is_empty() {
            continue;
        }

        if form.attachments.len() == MAX_ATTACHMENTS {
            return Err(AppError::PayloadTooLarge(format!(
                "At most {MAX_ATTACHMENTS} attachments are allowed"
            )));
        }
        if content.len() > MAX_ATTACHMENT_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Attachment '{filename}' exceeds the 5 MB limit"
            )));
        }

        form.attachments
            .push(Attachment::new(filename, content.to_vec(), content_type));
    }

    Ok(form)
}

/// Send the submitted message through the selected provider
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let form = read_form(multipart).await?;
    let token = form.provider_token();

    info!(
        provider = %token,
        attachments = form.attachments.len(),
        "Email send request received"
    );

    let provider = Provider::from_token(&token).map_err(dispatch_error)?;
    let message = form.into_message();
    let delivery = state
        .dispatcher
        .send(&message, provider)
        .await
        .map_err(dispatch_error)?;

    Ok(Json(SubmitResponse {
        success: true,
        provider,
        credentials_unavailable: delivery.credentials_unavailable(),
        delivery,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_to_gmail() {
        let mut form = SubmitForm::default();
        assert_eq!(form.provider_token(), "gmail");

        form.set("provider", "  ".into());
        assert_eq!(form.provider_token(), "gmail");

        form.set("provider", "SendGrid".into());
        assert_eq!(form.provider_token(), "sendgrid");
    }

    #[test]
    fn form_fields_map_onto_message() {
        let mut form = SubmitForm::default();
        for (name, value) in [
            ("from", "me@example.com"),
            ("to", "a@b.com"),
            ("subject", "Hi"),
            ("tbody", "Hello"),
            ("cc", "c@d.com"),
            ("bcc", ""),
            ("extra", "ignored"),
        ] {
            form.set(name, value.into());
        }

        let message = form.into_message();
        assert_eq!(message.from.as_deref(), Some("me@example.com"));
        assert_eq!(message.body, "Hello");
        assert_eq!(message.recipients(), vec!["a@b.com", "c@d.com"]);
    }
}
