//! Response decoding.
//!
//! The REST surface wraps results in a `{"Count", "Data", "Total"}` envelope
//! when it answers with JSON, and sends plain tables when it answers with
//! CSV. The shape the caller wants is expressed by the [`Target`] type, so
//! the right decoding path is picked at compile time from the requested type
//! and at run time from the response's `Content-Type`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Why a response body could not be decoded.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
}

/// A decoded body plus the envelope counters.
///
/// `count` and `total` are only meaningful for JSON envelopes; they are 0
/// for CSV bodies and for targets that are not wrapped in an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub data: T,
    /// Number of results in this page.
    pub count: u64,
    /// Number of results across all pages.
    pub total: u64,
}

impl<T> Decoded<T> {
    /// A value that carries no envelope counters.
    pub fn bare(data: T) -> Self {
        Self {
            data,
            count: 0,
            total: 0,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Count", default)]
    count: u64,
    #[serde(rename = "Data")]
    data: Option<T>,
    #[serde(rename = "Total", default)]
    total: u64,
}

/// Reads the JSON envelope and hands back its `Data`, or `T::default()`
/// when the server sent none.
pub fn read_envelope<T: DeserializeOwned + Default>(body: &[u8]) -> Result<Decoded<T>, DecodeError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(Decoded {
        data: envelope.data.unwrap_or_default(),
        count: envelope.count,
        total: envelope.total,
    })
}

/// A type a response can be decoded into.
///
/// Bodies that are neither JSON nor CSV are not decoded: the caller gets
/// `Self::default()` and zeroed counters.
pub trait Target: Sized + Default {
    /// Decodes an `application/json` body.
    fn from_json(body: &[u8]) -> Result<Decoded<Self>, DecodeError>;

    /// Decodes a `text/csv` body.
    fn from_csv(body: &[u8]) -> Result<Self, DecodeError>;

    /// Handles a body with any other (or no) content type.
    fn from_other(_content_type: Option<&str>, _body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        Ok(Decoded::bare(Self::default()))
    }
}

/// Records from the envelope's `Data`, or CSV rows deserialized by header name.
impl<R: DeserializeOwned> Target for Vec<R> {
    fn from_json(body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        read_envelope(body)
    }

    fn from_csv(body: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = csv::Reader::from_reader(body);
        let records = reader.deserialize().collect::<Result<Vec<R>, _>>()?;
        Ok(records)
    }
}

/// The envelope's `Data` as untyped JSON; CSV becomes an array of string arrays.
impl Target for serde_json::Value {
    fn from_json(body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        read_envelope(body)
    }

    fn from_csv(body: &[u8]) -> Result<Self, DecodeError> {
        let rows = read_rows(body)?;
        Ok(serde_json::Value::Array(
            rows.into_iter()
                .map(|row| row.into_iter().map(serde_json::Value::String).collect())
                .collect(),
        ))
    }
}

/// For calls whose response body is ignored.
impl Target for () {
    fn from_json(_body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        Ok(Decoded::bare(()))
    }

    fn from_csv(_body: &[u8]) -> Result<Self, DecodeError> {
        Ok(())
    }
}

/// A raw CSV table, header row included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable(pub Vec<Vec<String>>);

impl CsvTable {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.0
    }

    /// The first row, if any.
    pub fn header(&self) -> Option<&[String]> {
        self.0.first().map(Vec::as_slice)
    }
}

impl Target for CsvTable {
    fn from_json(_body: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        Err(DecodeError::UnsupportedContentType(JSON.to_string()))
    }

    fn from_csv(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(CsvTable(read_rows(body)?))
    }
}

fn read_rows(body: &[u8]) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

const JSON: &str = "application/json";
const CSV: &str = "text/csv";

/// Decodes `body` according to `content_type` into `T`.
pub fn decode<T: Target>(body: &[u8], content_type: Option<&str>) -> Result<Decoded<T>, DecodeError> {
    let lowered = content_type.map(str::to_ascii_lowercase);
    match lowered.as_deref() {
        Some(ct) if ct.contains(JSON) => T::from_json(body),
        Some(ct) if ct.contains(CSV) => T::from_csv(body).map(Decoded::bare),
        _ => T::from_other(content_type, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(rename = "Email")]
        email: String,
    }

    #[test]
    fn test_empty_envelope() {
        let body = br#"{"Count":0,"Data":[],"Total":0}"#;
        let decoded = decode::<Vec<TestStruct>>(body, Some(JSON)).unwrap();
        assert_eq!(decoded.count, 0);
        assert_eq!(decoded.total, 0);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_envelope_counts_and_data() {
        let body = br#"{"Count":2,"Data":[{"Email":"qwe@qwe.com"},{"Email":"aze@aze.com"}],"Total":1}"#;
        let decoded = decode::<Vec<TestStruct>>(body, Some("application/json; charset=UTF-8")).unwrap();
        assert_eq!(decoded.count, 2);
        assert_eq!(decoded.total, 1);
        assert_eq!(decoded.data[0].email, "qwe@qwe.com");
        assert_eq!(decoded.data[1].email, "aze@aze.com");
    }

    #[test]
    fn test_missing_data_defaults() {
        let decoded = decode::<Vec<TestStruct>>(br#"{"Count":0}"#, Some(JSON)).unwrap();
        assert!(decoded.data.is_empty());

        let decoded = decode::<serde_json::Value>(br#"{"Total":3}"#, Some(JSON)).unwrap();
        assert_eq!(decoded.data, serde_json::Value::Null);
        assert_eq!(decoded.total, 3);
    }

    #[test]
    fn test_content_type_is_case_insensitive() {
        let body = br#"{"Count":1,"Data":[{"Email":"a@b.c"}],"Total":1}"#;
        let decoded = decode::<Vec<TestStruct>>(body, Some("Application/JSON")).unwrap();
        assert_eq!(decoded.data.len(), 1);
    }

    #[test]
    fn test_malformed_json() {
        let err = decode::<Vec<TestStruct>>(b"{\"Count\":", Some(JSON)).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_csv_table() {
        let body = b"Email,Name\na@b.c,Alice\nd@e.f,\"Bob, Jr\"\n";
        let decoded = decode::<CsvTable>(body, Some("text/csv")).unwrap();
        assert_eq!(decoded.count, 0);
        assert_eq!(decoded.total, 0);
        assert_eq!(decoded.data.header(), Some(&["Email".to_string(), "Name".to_string()][..]));
        assert_eq!(decoded.data.rows()[2], vec!["d@e.f", "Bob, Jr"]);
    }

    #[test]
    fn test_csv_into_records() {
        let body = b"Email\na@b.c\nd@e.f\n";
        let decoded = decode::<Vec<TestStruct>>(body, Some("text/csv")).unwrap();
        assert_eq!(
            decoded.data,
            vec![
                TestStruct { email: "a@b.c".to_string() },
                TestStruct { email: "d@e.f".to_string() },
            ]
        );
    }

    #[test]
    fn test_csv_into_value() {
        let decoded = decode::<serde_json::Value>(b"a,b\n1,2\n", Some("text/csv")).unwrap();
        assert_eq!(decoded.data, serde_json::json!([["a", "b"], ["1", "2"]]));
    }

    #[test]
    fn test_table_rejects_json() {
        let err = decode::<CsvTable>(b"{}", Some(JSON)).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedContentType(_)));
    }

    #[test]
    fn test_other_content_types_are_left_undecoded() {
        let decoded = decode::<Vec<TestStruct>>(b"<html/>", Some("text/html")).unwrap();
        assert!(decoded.data.is_empty());
        assert_eq!(decoded.count, 0);
        assert_eq!(decoded.total, 0);

        let decoded = decode::<serde_json::Value>(b"\x00\x01", None).unwrap();
        assert_eq!(decoded.data, serde_json::Value::Null);

        let decoded = decode::<CsvTable>(b"whatever", Some("application/octet-stream")).unwrap();
        assert!(decoded.data.rows().is_empty());

        assert!(decode::<()>(b"", None).is_ok());
        assert!(decode::<()>(b"{\"garbage\"", Some(JSON)).is_ok());
    }
}
