//! Deterministic record encoding used as the content-hash preimage.
//!
//! Byte fields are written as padded standard base64 (or `null`), timestamps
//! as RFC 3339 with trailing fractional zeros trimmed, and strings with the
//! HTML-sensitive characters escaped. Every stored hash depends on this exact
//! layout, so none of it may change.

use std::io;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;

/// A link as it appears on the wire. Field order is load-bearing.
#[derive(Debug, Serialize)]
pub(crate) struct LinkRecord<'a> {
    #[serde(serialize_with = "serialize_bytes")]
    pub parent_hash: Option<&'a [u8]>,
    #[serde(serialize_with = "serialize_bytes")]
    pub hash: Option<&'a [u8]>,
    pub index: u64,
    pub pow: u64,
    pub difficulty: u32,
    pub data: &'a str,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: &'a DateTime<Utc>,
}

/// Encode any record with the escaping rules above.
pub(crate) fn to_vec<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(192);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, HtmlSafeFormatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// RFC 3339 in UTC with nanosecond precision, trailing zeros (and the dot)
/// dropped: `2019-03-24T13:42:58Z`, `2019-03-24T13:42:58.5Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = ts.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos > 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

fn serialize_bytes<S: Serializer>(bytes: &Option<&[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(b) => serializer.serialize_str(&STANDARD.encode(b)),
        None => serializer.serialize_none(),
    }
}

fn serialize_timestamp<S: Serializer>(ts: &&DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

/// Compact JSON that additionally escapes `<`, `>`, `&`, U+2028 and U+2029.
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record<'a>(data: &'a str, ts: &'a DateTime<Utc>) -> LinkRecord<'a> {
        LinkRecord {
            parent_hash: None,
            hash: None,
            index: 0,
            pow: 0,
            difficulty: 1,
            data,
            timestamp: ts,
        }
    }

    #[test]
    fn timestamp_trims_fraction() {
        let whole = Utc.with_ymd_and_hms(2019, 3, 24, 13, 42, 58).unwrap();
        assert_eq!(format_timestamp(&whole), "2019-03-24T13:42:58Z");

        let half = whole + chrono::Duration::milliseconds(500);
        assert_eq!(format_timestamp(&half), "2019-03-24T13:42:58.5Z");

        let nanos = whole + chrono::Duration::nanoseconds(120);
        assert_eq!(format_timestamp(&nanos), "2019-03-24T13:42:58.00000012Z");
    }

    #[test]
    fn record_layout_is_fixed() {
        let ts = Utc.with_ymd_and_hms(2019, 3, 24, 13, 42, 58).unwrap();
        let json = to_vec(&record("Hello World!", &ts)).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"parent_hash":null,"hash":null,"index":0,"pow":0,"difficulty":1,"data":"Hello World!","timestamp":"2019-03-24T13:42:58Z"}"#
        );
    }

    #[test]
    fn bytes_are_base64() {
        let ts = Utc.with_ymd_and_hms(2019, 3, 24, 13, 42, 58).unwrap();
        let mut rec = record("", &ts);
        rec.hash = Some(&[0xde, 0xad, 0xbe, 0xef]);
        let json = String::from_utf8(to_vec(&rec).unwrap()).unwrap();
        assert!(json.contains(r#""hash":"3q2+7w==""#));
    }

    #[test]
    fn html_characters_escaped() {
        let ts = Utc.with_ymd_and_hms(2019, 3, 24, 13, 42, 58).unwrap();
        let json = to_vec(&record("<a & b>\u{2028}\"q\"", &ts)).unwrap();
        let json = String::from_utf8(json).unwrap();
        assert!(json.contains(r#""data":"\u003ca \u0026 b\u003e\u2028\"q\"""#));
    }
}
