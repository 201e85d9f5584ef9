//! REST resource records.
//!
//! A subset of the REST catalog: the resources needed for contact management,
//! senders, API keys, campaigns and templates. Server-owned fields are
//! `ReadOnly` and never sent back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// API key access level.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub enum RunLevel {
    #[default]
    Normal,
    Softlock,
    Hardlock,
}

crate::record! {
    /// `contact`: a recipient address known to the account.
    pub struct Contact {
        #[serde(deserialize_with = "timestamp")]
        pub created_at: Option<DateTime<Utc>> => "CreatedAt" [ReadOnly],
        pub delivered_count: i64 => "DeliveredCount" [ReadOnly],
        pub email: String => "Email",
        pub id: i64 => "ID" [ReadOnly],
        pub is_opt_in_pending: bool => "IsOptInPending" [ReadOnly],
        pub is_spam_complaining: bool => "IsSpamComplaining" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub last_activity_at: Option<DateTime<Utc>> => "LastActivityAt" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub last_update_at: Option<DateTime<Utc>> => "LastUpdateAt" [ReadOnly],
        pub name: String => "Name" [OmitEmpty],
        #[serde(deserialize_with = "timestamp")]
        pub unsubscribed_at: Option<DateTime<Utc>> => "UnsubscribedAt" [ReadOnly],
        pub unsubscribed_by: String => "UnsubscribedBy" [ReadOnly],
    }
}

crate::record! {
    /// `contactslist`: a named list of contacts.
    pub struct Contactslist {
        pub address: String => "Address" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub created_at: Option<DateTime<Utc>> => "CreatedAt" [ReadOnly],
        pub id: i64 => "ID" [ReadOnly],
        pub is_deleted: bool => "IsDeleted" [OmitEmpty],
        pub name: String => "Name" [OmitEmpty],
        pub subscriber_count: i64 => "SubscriberCount" [ReadOnly],
    }
}

crate::record! {
    /// `listrecipient`: a contact's membership in a list.
    pub struct Listrecipient {
        pub contact_id: i64 => "ContactID" [ReadOnly],
        pub contact_alt: String => "ContactALT" [ReadOnly],
        pub id: i64 => "ID" [ReadOnly],
        pub is_active: bool => "IsActive" [OmitEmpty],
        pub is_unsubscribed: bool => "IsUnsubscribed" [OmitEmpty],
        pub list_id: i64 => "ListID" [OmitEmpty],
        pub list_alt: String => "ListALT" [OmitEmpty],
        #[serde(deserialize_with = "timestamp")]
        pub unsubscribed_at: Option<DateTime<Utc>> => "UnsubscribedAt" [OmitEmpty],
    }
}

crate::record! {
    /// `sender`: an address allowed to send on behalf of the account.
    pub struct Sender {
        #[serde(deserialize_with = "timestamp")]
        pub created_at: Option<DateTime<Utc>> => "CreatedAt" [ReadOnly],
        pub dns_id: i64 => "DNSID" [ReadOnly],
        pub email: String => "Email",
        pub email_type: String => "EmailType" [OmitEmpty],
        pub filename: String => "Filename" [ReadOnly],
        pub id: i64 => "ID" [ReadOnly],
        pub is_default_sender: bool => "IsDefaultSender" [OmitEmpty],
        pub name: String => "Name" [OmitEmpty],
        pub status: String => "Status" [ReadOnly],
    }
}

crate::record! {
    /// `apikey`: an API key pair and its settings.
    pub struct Apikey {
        pub acl: String => "ACL" [OmitEmpty],
        pub api_key: String => "APIKey" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub created_at: Option<DateTime<Utc>> => "CreatedAt" [ReadOnly],
        pub id: i64 => "ID" [ReadOnly],
        pub is_active: bool => "IsActive" [OmitEmpty],
        pub is_master: bool => "IsMaster" [ReadOnly],
        pub name: String => "Name",
        pub quarantine_value: i64 => "QuarantineValue" [ReadOnly],
        pub runlevel: RunLevel => "Runlevel" [ReadOnly],
        pub secret_key: String => "SecretKey" [ReadOnly],
        pub track_host: String => "TrackHost" [ReadOnly],
        pub user_id: i64 => "UserID" [ReadOnly],
    }
}

crate::record! {
    /// `campaign`: a sent campaign; only the flags are writable.
    pub struct Campaign {
        pub campaign_type: i64 => "CampaignType" [ReadOnly],
        pub click_tracked: i64 => "ClickTracked" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub created_at: Option<DateTime<Utc>> => "CreatedAt" [ReadOnly],
        pub custom_value: String => "CustomValue" [ReadOnly],
        pub first_message_id: i64 => "FirstMessageID" [ReadOnly],
        pub from_id: i64 => "FromID" [ReadOnly],
        pub from_alt: String => "FromALT" [ReadOnly],
        pub from_email: String => "FromEmail" [ReadOnly],
        pub from_name: String => "FromName" [ReadOnly],
        pub has_html_count: i64 => "HasHtmlCount" [ReadOnly],
        pub has_txt_count: i64 => "HasTxtCount" [ReadOnly],
        pub id: i64 => "ID" [ReadOnly],
        pub is_deleted: bool => "IsDeleted" [OmitEmpty],
        pub is_starred: bool => "IsStarred" [OmitEmpty],
        pub list_id: i64 => "ListID" [ReadOnly],
        pub list_alt: String => "ListALT" [ReadOnly],
        pub news_letter_id: i64 => "NewsLetterID" [ReadOnly],
        pub open_tracked: i64 => "OpenTracked" [ReadOnly],
        pub segmentation_id: i64 => "SegmentationID" [ReadOnly],
        pub segmentation_alt: String => "SegmentationALT" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub send_end_at: Option<DateTime<Utc>> => "SendEndAt" [ReadOnly],
        #[serde(deserialize_with = "timestamp")]
        pub send_start_at: Option<DateTime<Utc>> => "SendStartAt" [ReadOnly],
        pub spamass_score: f64 => "SpamassScore" [ReadOnly],
        pub status: String => "Status" [ReadOnly],
        pub subject: String => "Subject" [ReadOnly],
        pub unsubscribe_tracked_count: i64 => "UnsubscribeTrackedCount" [ReadOnly],
    }
}

crate::record! {
    /// `contactdata`: custom property values of a contact.
    pub struct Contactdata {
        pub contact_id: i64 => "ContactID" [OmitEmpty],
        pub data: Vec<HashMap<String, String>> => "Data" [OmitEmpty],
        pub id: i64 => "ID" [ReadOnly],
    }
}

crate::record! {
    /// `template`: a stored message template.
    pub struct Template {
        pub author: String => "Author" [OmitEmpty],
        pub categories: Vec<String> => "Categories" [OmitEmpty],
        pub copyright: String => "Copyright" [OmitEmpty],
        pub description: String => "Description" [OmitEmpty],
        pub edit_mode: i64 => "EditMode" [OmitEmpty],
        pub id: i64 => "ID" [ReadOnly],
        pub is_starred: bool => "IsStarred" [OmitEmpty],
        pub name: String => "Name" [OmitEmpty],
        pub owner_id: i64 => "OwnerId" [ReadOnly],
        pub owner_type: String => "OwnerType" [OmitEmpty],
        pub presets: String => "Presets" [OmitEmpty],
        pub previews: Vec<i64> => "Previews" [ReadOnly],
        pub purposes: Vec<String> => "Purposes" [OmitEmpty],
    }
}

/// RFC 3339 timestamps; the API sends `""` or `null` for unset ones.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
