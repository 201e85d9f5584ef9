//! Send API message, result and error shapes (v3 and v3.1).

use crate::decode::{DecodeError, Decoded, Target};
use crate::payload::encode_record;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

crate::record! {
    /// A message for the v3 Send API (`POST /v3/send/message`).
    ///
    /// Several messages can be sent at once through `messages`.
    pub struct InfoSendMail {
        pub from_email: String => "FromEmail",
        pub from_name: String => "FromName",
        pub sender: String => "Sender" [OmitEmpty],
        pub recipients: Vec<Recipient> => "Recipients" [OmitEmpty],
        pub to: String => "To" [OmitEmpty],
        pub cc: String => "Cc" [OmitEmpty],
        pub bcc: String => "Bcc" [OmitEmpty],
        pub subject: String => "Subject",
        pub text_part: String => "Text-part" as TextPart [OmitEmpty],
        pub html_part: String => "Html-part" as HTMLPart [OmitEmpty],
        pub attachments: Vec<Attachment> => "Attachments" [OmitEmpty],
        pub inline_attachments: Vec<Attachment> => "Inline_attachments" as InlineAttachments [OmitEmpty],
        pub mj_prio: i64 => "Mj-prio" as MjPrio [OmitEmpty],
        pub mj_campaign: String => "Mj-campaign" as MjCampaign [OmitEmpty],
        pub mj_deduplicate_campaign: bool => "Mj-deduplicatecampaign" as MjDeduplicateCampaign [OmitEmpty],
        pub mj_custom_id: String => "Mj-CustomID" as MjCustomID [OmitEmpty],
        pub mj_template_id: String => "Mj-TemplateID" as MjTemplateID [OmitEmpty],
        pub mj_template_error_reporting: String => "MJ-TemplateErrorReporting" as MjTemplateErrorReporting [OmitEmpty],
        pub mj_template_language: String => "Mj-TemplateLanguage" as MjTemplateLanguage [OmitEmpty],
        pub mj_template_error_deliver: String => "MJ-TemplateErrorDeliver" as MjTemplateErrorDeliver [OmitEmpty],
        pub mj_event_payload: String => "Mj-EventPayLoad" as MjEventPayLoad [OmitEmpty],
        pub headers: HashMap<String, String> => "Headers" [OmitEmpty],
        pub vars: serde_json::Value => "Vars" [OmitEmpty],
        #[serde(serialize_with = "serialize_nested")]
        pub messages: Vec<InfoSendMail> => "Messages" [OmitEmpty],
    }
}

/// Nested messages follow the same omission rules as the top-level one.
fn serialize_nested<S: Serializer>(messages: &[InfoSendMail], serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::{Error, SerializeSeq};

    let mut seq = serializer.serialize_seq(Some(messages.len()))?;
    for message in messages {
        let object = encode_record(message, None).map_err(S::Error::custom)?;
        seq.serialize_element(&object)?;
    }
    seq.end()
}

/// A v3 recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Vars", skip_serializing_if = "serde_json::Value::is_null")]
    pub vars: serde_json::Value,
}

/// A v3 attachment; `content` is base64.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Filename")]
    pub filename: String,
}

/// The v3 Send API result: one entry per recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SentResult {
    #[serde(rename = "Sent")]
    pub sent: Vec<SentMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SentMessage {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "MessageID")]
    pub message_id: i64,
}

/// The send result is not wrapped in a `{Count, Data, Total}` envelope.
impl Target for SentResult {
    fn from_json(body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        Ok(Decoded::bare(serde_json::from_slice(body)?))
    }

    fn from_csv(_body: &[u8]) -> Result<Self, DecodeError> {
        Err(DecodeError::UnsupportedContentType("text/csv".to_string()))
    }
}

crate::record! {
    /// A batch for the v3.1 Send API (`POST /v3.1/send`).
    pub struct MessagesV31 {
        pub messages: Vec<InfoMessagesV31> => "Messages",
        pub sandbox_mode: bool => "SandboxMode" [OmitEmpty],
        pub advance_error_handling: bool => "AdvanceErrorHandling" [OmitEmpty],
    }
}

/// One message of a v3.1 batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InfoMessagesV31 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<RecipientV31>,
    #[serde(rename = "ReplyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<RecipientV31>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<RecipientV31>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<RecipientV31>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<RecipientV31>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<RecipientV31>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentV31>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inlined_attachments: Vec<InlinedAttachmentV31>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text_part: String,
    #[serde(rename = "HTMLPart", skip_serializing_if = "String::is_empty")]
    pub html_part: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub priority: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_campaign: String,
    #[serde(rename = "StatisticsContactsListID", skip_serializing_if = "is_zero")]
    pub statistics_contacts_list_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub monitoring_category: String,
    #[serde(skip_serializing_if = "is_false")]
    pub deduplicate_campaign: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub track_clicks: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub track_opens: String,
    #[serde(rename = "CustomID", skip_serializing_if = "String::is_empty")]
    pub custom_id: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_payload: String,
    #[serde(rename = "TemplateID", skip_serializing_if = "is_zero")]
    pub template_id: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub template_language: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_error_reporting: Option<RecipientV31>,
    #[serde(skip_serializing_if = "is_false")]
    pub template_error_deliver: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, serde_json::Value>,
    #[serde(rename = "URLTags", skip_serializing_if = "String::is_empty")]
    pub url_tags: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientV31 {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name", skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl RecipientV31 {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: String::new(),
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AttachmentV31 {
    pub content_type: String,
    pub filename: String,
    pub base64_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InlinedAttachmentV31 {
    pub content_type: String,
    pub filename: String,
    pub base64_content: String,
    #[serde(rename = "ContentID", skip_serializing_if = "String::is_empty")]
    pub content_id: String,
}

/// Per-message results of a v3.1 send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResultsV31 {
    #[serde(rename = "Messages")]
    pub results: Vec<ResultV31>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ResultV31 {
    pub status: String,
    #[serde(rename = "CustomID")]
    pub custom_id: String,
    pub to: Vec<GeneratedMessageV31>,
    pub cc: Vec<GeneratedMessageV31>,
    pub bcc: Vec<GeneratedMessageV31>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratedMessageV31 {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "MessageUUID")]
    pub message_uuid: String,
    #[serde(rename = "MessageID")]
    pub message_id: i64,
    #[serde(rename = "MessageHref")]
    pub message_href: String,
}

/// Validation feedback returned by the v3.1 Send API with 400 or 403.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiFeedbackErrors {
    #[serde(rename = "Messages")]
    pub messages: Vec<ApiFeedbackErrorsMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiFeedbackErrorsMessage {
    #[serde(rename = "Errors")]
    pub errors: Vec<ApiFeedbackError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ApiFeedbackError {
    pub error_identifier: String,
    pub error_code: String,
    pub status_code: u16,
    pub error_message: String,
    pub error_related_to: Vec<String>,
}

impl ApiFeedbackErrors {
    /// All errors of all messages, in order.
    pub fn errors(&self) -> impl Iterator<Item = &ApiFeedbackError> {
        self.messages.iter().flat_map(|message| message.errors.iter())
    }
}

impl fmt::Display for ApiFeedbackErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in self.errors() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{} {}", error.error_code, error.error_message)?;
            if !error.error_related_to.is_empty() {
                write!(f, " [{}]", error.error_related_to.join(", "))?;
            }
        }
        if first {
            f.write_str("no error details")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiFeedbackErrors {}

/// Generic error body returned by the v3.1 Send API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorInfoV31 {
    #[serde(rename = "ErrorIdentifier")]
    pub identifier: String,
    #[serde(rename = "ErrorInfo")]
    pub info: String,
    #[serde(rename = "ErrorMessage")]
    pub message: String,
    #[serde(rename = "StatusCode")]
    pub status_code: u16,
}

impl fmt::Display for ErrorInfoV31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)?;
        if !self.info.is_empty() {
            write!(f, " ({})", self.info)?;
        }
        if !self.identifier.is_empty() {
            write!(f, " [{}]", self.identifier)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorInfoV31 {}
