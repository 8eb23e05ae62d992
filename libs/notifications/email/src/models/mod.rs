use serde::{Deserialize, Serialize};
use std::fmt;

/// File attached to an outgoing message.
#[derive(Clone, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    /// MIME type, e.g. `application/pdf`
    pub content_type: String,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Email message to be dispatched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    /// Sender (defaults to the provider's configured sender)
    pub from: Option<String>,
    /// Recipient address or comma-separated list
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Comma-separated CC list
    pub cc: Option<String>,
    /// Comma-separated BCC list
    pub bcc: Option<String>,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Create a new message with required fields
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn to_addresses(&self) -> Vec<String> {
        split_addresses(&self.to)
    }

    pub fn cc_addresses(&self) -> Vec<String> {
        self.cc.as_deref().map(split_addresses).unwrap_or_default()
    }

    pub fn bcc_addresses(&self) -> Vec<String> {
        self.bcc.as_deref().map(split_addresses).unwrap_or_default()
    }

    /// Every envelope recipient: to, then cc, then bcc.
    pub fn recipients(&self) -> Vec<String> {
        let mut all = self.to_addresses();
        all.extend(self.cc_addresses());
        all.extend(self.bcc_addresses());
        all
    }

    /// Names of required fields that are empty or whitespace-only.
    /// A `to` list made only of separators counts as empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.to_addresses().is_empty() {
            missing.push("to");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.body.trim().is_empty() {
            missing.push("message content");
        }
        missing
    }
}

/// Split a comma-separated address list, dropping blanks.
pub fn split_addresses(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Why a transport does not talk to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandInReason {
    /// Forced by configuration, or the live transport failed verification.
    Mock,
    /// Credentials are missing or still placeholders.
    CredentialsUnavailable,
}

/// Normalized outcome of a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub message_id: String,
    /// Raw server reply, or the stand-in's synthetic reply
    pub response: String,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stand_in_notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stand_in_reason: Option<StandInReason>,
}

impl DeliveryResult {
    /// `true` when nothing was actually handed to a provider.
    pub fn is_simulated(&self) -> bool {
        self.stand_in_reason.is_some()
    }

    pub fn credentials_unavailable(&self) -> bool {
        self.stand_in_reason == Some(StandInReason::CredentialsUnavailable)
    }
}
