//! Request payload encoding with field selection.
//!
//! A payload is either nothing, raw bytes passed through untouched, or a
//! [`Record`]. Records carry a static table of [`FieldSpec`]s describing each
//! field's declared name, serialized name and flags; [`encode`] uses that
//! table to decide which fields end up in the JSON body.
//!
//! Records are usually declared with the [`record!`](crate::record) macro:
//!
//! ```
//! use mailjet::payload::{encode, Payload};
//!
//! mailjet::record! {
//!     pub struct Note {
//!         pub id: i64 => "ID" [ReadOnly],
//!         pub email: String => "Email",
//!         pub text_part: String => "Text-Part" as TextPart [OmitEmpty],
//!     }
//! }
//!
//! let note = Note { id: 7, email: "a@b.c".into(), text_part: "hi".into() };
//! let body = encode(&Payload::from(&note), Some(&["Email", "TextPart"])).unwrap();
//! assert_eq!(body, br#"{"Email":"a@b.c","Text-Part":"hi"}"#);
//! ```

use serde_json::{Map, Value};
use std::sync::Arc;

/// Behaviour flags attached to a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFlag {
    /// The server owns this field; it is never sent.
    ReadOnly,
    /// Skip the field when it holds its empty value and no selection is given.
    OmitEmpty,
}

/// Static description of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    field: &'static str,
    name: &'static str,
    flags: &'static [FieldFlag],
}

impl FieldSpec {
    /// Describes a field declared as `field` and serialized as `name`.
    pub const fn new(field: &'static str, name: &'static str, flags: &'static [FieldFlag]) -> Self {
        Self { field, name, flags }
    }

    /// The declared name, matched against field selections.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The serialized JSON key.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(&FieldFlag::ReadOnly)
    }

    pub fn omits_empty(&self) -> bool {
        self.flags.contains(&FieldFlag::OmitEmpty)
    }
}

/// A structured value that can be sent as a request body.
///
/// `to_value` must produce a JSON object whose keys are the serialized names
/// listed in `fields`.
pub trait Record {
    /// Field descriptors in declaration order.
    fn fields(&self) -> &'static [FieldSpec];

    /// Serializes every field.
    fn to_value(&self) -> serde_json::Result<Value>;
}

impl<R: Record + ?Sized> Record for &R {
    fn fields(&self) -> &'static [FieldSpec] {
        (**self).fields()
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        (**self).to_value()
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn fields(&self) -> &'static [FieldSpec] {
        (**self).fields()
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        (**self).to_value()
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn fields(&self) -> &'static [FieldSpec] {
        (**self).fields()
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        (**self).to_value()
    }
}

/// A request body before encoding.
#[derive(Clone, Copy, Default)]
pub enum Payload<'a> {
    /// No body.
    #[default]
    Empty,
    /// Bytes sent as-is, without field filtering.
    Raw(&'a [u8]),
    /// A record encoded to a JSON object.
    Record(&'a (dyn Record + Sync)),
}

impl<'a> Payload<'a> {
    pub fn record(record: &'a (dyn Record + Sync)) -> Self {
        Payload::Record(record)
    }
}

impl std::fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::Raw(bytes) => write!(f, "Raw({} bytes)", bytes.len()),
            Payload::Record(record) => write!(f, "Record({} fields)", record.fields().len()),
        }
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(value: &'a str) -> Self {
        Payload::Raw(value.as_bytes())
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(value: &'a String) -> Self {
        Payload::Raw(value.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(value: &'a [u8]) -> Self {
        Payload::Raw(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Payload::Raw(value)
    }
}

impl<'a, R: Record + Sync> From<&'a R> for Payload<'a> {
    fn from(value: &'a R) -> Self {
        Payload::Record(value)
    }
}

/// Encodes a payload into a request body.
///
/// With `only_fields`, exactly the listed fields are emitted, in the listed
/// order, minus unknown and read-only ones. Without it, every field is emitted
/// in declaration order except read-only fields and empty `OmitEmpty` fields.
pub fn encode(payload: &Payload<'_>, only_fields: Option<&[&str]>) -> serde_json::Result<Vec<u8>> {
    match payload {
        Payload::Empty => Ok(Vec::new()),
        Payload::Raw(bytes) => Ok(bytes.to_vec()),
        Payload::Record(record) => {
            let object = encode_record(*record, only_fields)?;
            serde_json::to_vec(&object)
        }
    }
}

/// Applies the same field rules as [`encode`] and returns the JSON object
/// instead of its bytes.
pub fn encode_record(
    record: &dyn Record,
    only_fields: Option<&[&str]>,
) -> serde_json::Result<Map<String, Value>> {
    let mut values = match record.to_value()? {
        Value::Object(values) => values,
        other => {
            return Err(serde::ser::Error::custom(format!(
                "record serialized to {} instead of an object",
                kind(&other)
            )))
        }
    };

    let specs = record.fields();
    let mut res = Map::new();
    match only_fields {
        Some(only_fields) => {
            for only_field in only_fields {
                let Some(spec) = specs.iter().find(|spec| spec.field() == *only_field) else {
                    continue;
                };
                if spec.is_read_only() {
                    continue;
                }
                if let Some(value) = values.remove(spec.name()) {
                    res.insert(spec.name().to_string(), value);
                }
            }
        }
        None => {
            for spec in specs {
                if spec.is_read_only() {
                    continue;
                }
                let Some(value) = values.remove(spec.name()) else {
                    continue;
                };
                if spec.omits_empty() && is_empty_value(&value) {
                    continue;
                }
                res.insert(spec.name().to_string(), value);
            }
        }
    }
    Ok(res)
}

/// Returns `true` for the serialized form of an empty value.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Declares a record type together with its field descriptor table.
///
/// Each field is written `name: Type => "SerializedName"`, optionally followed
/// by `as DeclaredName` when the serialized name differs from the name used
/// in field selections, and by a flag list such as `[ReadOnly]` or
/// `[OmitEmpty]`. The generated struct derives `Debug`, `Clone`, `Default`,
/// `PartialEq`, `Serialize` and `Deserialize` (missing JSON keys fall back to
/// defaults), so every field type must implement those traits.
#[macro_export]
macro_rules! record {
    (@field $name:literal) => { $name };
    (@field $name:literal $field:ident) => { stringify!($field) };
    (
        $(#[$meta:meta])*
        $vis:vis struct $record:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $ident:ident : $ty:ty => $name:literal
                    $(as $field:ident)?
                    $([$($flag:ident),+ $(,)?])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        $vis struct $record {
            $(
                $(#[$field_meta])*
                #[serde(rename = $name)]
                $field_vis $ident: $ty,
            )*
        }

        impl $crate::payload::Record for $record {
            fn fields(&self) -> &'static [$crate::payload::FieldSpec] {
                const FIELDS: &[$crate::payload::FieldSpec] = &[
                    $(
                        $crate::payload::FieldSpec::new(
                            $crate::record!(@field $name $($field)?),
                            $name,
                            &[$($($crate::payload::FieldFlag::$flag),+)?],
                        ),
                    )*
                ];
                FIELDS
            }

            fn to_value(&self) -> ::serde_json::Result<::serde_json::Value> {
                ::serde_json::to_value(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    crate::record! {
        struct Test {
            id: i64 => "ID" [ReadOnly],
            name: String => "Name",
            email: String => "Email",
            address: String => "Address" [OmitEmpty, ReadOnly],
            text_part: String => "Text-Part" as TextPart [OmitEmpty],
            header: HashMap<String, String> => "Header" [OmitEmpty],
            campaign_id: i64 => "Mj-CampaignID" as MjCampaignID [OmitEmpty, ReadOnly],
        }
    }

    fn sample() -> Test {
        Test {
            id: -42,
            email: "ex@mple.com".to_string(),
            text_part: "This is text".to_string(),
            ..Default::default()
        }
    }

    fn encode_str(payload: Payload<'_>, only_fields: Option<&[&str]>) -> String {
        String::from_utf8(encode(&payload, only_fields).unwrap()).unwrap()
    }

    #[test]
    fn test_selection_uses_serialized_alias() {
        let test = sample();
        let body = encode_str(Payload::from(&test), Some(&["Email", "TextPart"]));
        assert_eq!(body, r#"{"Email":"ex@mple.com","Text-Part":"This is text"}"#);
    }

    #[test]
    fn test_no_selection_skips_read_only_and_empty() {
        let test = sample();
        let body = encode_str(Payload::from(&test), None);
        assert_eq!(
            body,
            r#"{"Name":"","Email":"ex@mple.com","Text-Part":"This is text"}"#
        );
    }

    #[test]
    fn test_selection_overrides_omit_empty_but_not_read_only() {
        let test = sample();
        let body = encode_str(
            Payload::from(&test),
            Some(&["Header", "ID", "MjCampaignID", "Address", "Unknown"]),
        );
        assert_eq!(body, r#"{"Header":{}}"#);
    }

    #[test]
    fn test_selection_order_is_preserved() {
        let test = sample();
        let body = encode_str(Payload::from(&test), Some(&["TextPart", "Name", "Email"]));
        assert_eq!(
            body,
            r#"{"Text-Part":"This is text","Name":"","Email":"ex@mple.com"}"#
        );
    }

    #[test]
    fn test_selection_matches_declared_name_not_alias() {
        let test = sample();
        let body = encode_str(Payload::from(&test), Some(&["Text-Part", "text_part"]));
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_indirect_records_are_dereferenced() {
        let boxed: Box<Test> = Box::new(sample());
        let nested = &&boxed;
        let body = encode_str(Payload::from(nested), Some(&["Email"]));
        assert_eq!(body, r#"{"Email":"ex@mple.com"}"#);
    }

    #[test]
    fn test_raw_payloads_pass_through() {
        assert_eq!(encode_str(Payload::from("not json"), Some(&["Email"])), "not json");

        let bytes = vec![0x01u8, 0x02, 0x03];
        assert_eq!(encode(&Payload::from(&bytes), None).unwrap(), bytes);
    }

    #[test]
    fn test_empty_payload_is_empty_body() {
        assert!(encode(&Payload::Empty, None).unwrap().is_empty());
    }

    #[test]
    fn test_is_empty_value() {
        use serde_json::json;

        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!(0)));
        assert!(is_empty_value(&json!(0.0)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(true)));
        assert!(!is_empty_value(&json!(-1)));
        assert!(!is_empty_value(&json!(" ")));
        assert!(!is_empty_value(&json!([0])));
    }

    struct NotAnObject;

    impl Record for NotAnObject {
        fn fields(&self) -> &'static [FieldSpec] {
            &[]
        }

        fn to_value(&self) -> serde_json::Result<Value> {
            Ok(Value::Bool(true))
        }
    }

    #[test]
    fn test_non_object_record_is_an_encoding_error() {
        let err = encode(&Payload::from(&NotAnObject), None).unwrap_err();
        assert!(err.to_string().contains("a boolean"));
    }

    #[test]
    fn test_field_table() {
        let specs = sample().fields();
        assert_eq!(specs.len(), 7);
        assert_eq!(specs[4].field(), "TextPart");
        assert_eq!(specs[4].name(), "Text-Part");
        assert!(specs[4].omits_empty());
        assert!(!specs[4].is_read_only());
        assert_eq!(specs[1].field(), "Name");
        assert!(specs[0].is_read_only());
    }
}
