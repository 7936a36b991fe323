//! Flag values and their canonical string encoding.
//!
//! Every value that leaves this crate as text (range bounds, initial values,
//! fixed flag values, choice lists) goes through [`encode`]. The encoding is
//! chosen so that [`decode`] reads it back as the same value: strings that
//! would otherwise be read as a number, boolean, list or null are quoted.
//!
//! # Example
//!
//! ```
//! use skopt_ops::value::{FlagValue, decode, encode};
//!
//! assert_eq!(encode(&FlagValue::Float(1.0)), "1.0");
//! assert_eq!(encode(&FlagValue::Bool(true)), "yes");
//! assert_eq!(encode(&FlagValue::from("3")), "'3'");
//! assert_eq!(decode("0.3"), Some(FlagValue::Float(0.3)));
//! ```

use core::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A scalar or list value carried by a flag.
///
/// Absent values are represented as `Option::None` at call sites rather than
/// by a dedicated variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    Str(String),
    /// An ordered list of values.
    List(Vec<FlagValue>),
}

impl FlagValue {
    /// Returns the value as `f64` if it is an integer or float.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Int(v) => Some(*v as f64),
            FlagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` for integer and float values.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FlagValue::Int(_) | FlagValue::Float(_))
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        FlagValue::Bool(v)
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        FlagValue::Int(v)
    }
}

impl From<i32> for FlagValue {
    fn from(v: i32) -> Self {
        FlagValue::Int(i64::from(v))
    }
}

impl From<f64> for FlagValue {
    fn from(v: f64) -> Self {
        FlagValue::Float(v)
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        FlagValue::Str(v.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        FlagValue::Str(v)
    }
}

impl<T: Into<FlagValue>> From<Vec<T>> for FlagValue {
    fn from(v: Vec<T>) -> Self {
        FlagValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Encodes a value into its canonical string form.
#[must_use]
pub fn encode(value: &FlagValue) -> String {
    match value {
        FlagValue::Bool(true) => "yes".to_owned(),
        FlagValue::Bool(false) => "no".to_owned(),
        FlagValue::Int(v) => v.to_string(),
        FlagValue::Float(v) => encode_float(*v),
        FlagValue::Str(s) => quote_if_needed(s),
        FlagValue::List(items) => encode_list(items),
    }
}

/// Encodes an optional value, using `null` for an absent one.
#[must_use]
pub fn encode_opt(value: Option<&FlagValue>) -> String {
    value.map_or_else(|| "null".to_owned(), encode)
}

/// Encodes a sequence of values as `[a, b, c]`.
#[must_use]
pub fn encode_list(items: &[FlagValue]) -> String {
    let encoded: Vec<String> = items.iter().map(encode).collect();
    format!("[{}]", encoded.join(", "))
}

fn encode_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_owned()
    } else if v.is_infinite() {
        let s = if v.is_sign_positive() { "inf" } else { "-inf" };
        s.to_owned()
    } else {
        // Debug keeps a trailing `.0` on integral floats.
        format!("{v:?}")
    }
}

fn quote_if_needed(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.contains([',', '[', ']'])
        || s.starts_with(['\'', '"'])
        || !matches!(decode(s), Some(FlagValue::Str(ref decoded)) if decoded == s);
    if !needs_quotes {
        return s.to_owned();
    }
    // Inside a list, a string holding both quote characters may still split early.
    let q = if s.contains('\'') { '"' } else { '\'' };
    format!("{q}{s}{q}")
}

/// Returns the boolean spelled by `s`, accepting the YAML 1.1 forms
/// `yes`/`no` and `on`/`off` alongside `true`/`false`.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Some(true),
        "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Decodes a string produced by [`encode`] (or typed by a user) into a value.
///
/// Surrounding whitespace is ignored. Returns `None` for `null` and `~`.
/// List items are split on commas outside quotes and nested brackets.
#[must_use]
pub fn decode(s: &str) -> Option<FlagValue> {
    let trimmed = s.trim();
    if matches!(trimmed, "null" | "~") {
        return None;
    }
    if let Some(b) = parse_bool(trimmed) {
        return Some(FlagValue::Bool(b));
    }
    if let Some(inner) = unquote(trimmed) {
        return Some(FlagValue::Str(inner.to_owned()));
    }
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_items(inner).into_iter().filter_map(decode).collect()
        };
        return Some(FlagValue::List(items));
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(FlagValue::Int(v));
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(FlagValue::Float(v));
    }
    Some(FlagValue::Str(trimmed.to_owned()))
}

fn unquote(s: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            Some(&s[1..s.len() - 1])
        } else {
            None
        }
    })
}

fn split_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in inner.char_indices() {
        match quote {
            // A quote only closes an item when a comma or the end follows it.
            Some(q) if c == q && closes_item(&inner[i + c.len_utf8()..]) => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' if inner[start..i].trim().is_empty() => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    items.push(&inner[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    items.push(&inner[start..]);
    items
}

fn closes_item(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty() || rest.starts_with(',')
}

struct FlagValueVisitor;

impl<'de> Visitor<'de> for FlagValueVisitor {
    type Value = FlagValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, number, string or list")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FlagValue, E> {
        Ok(FlagValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FlagValue, E> {
        Ok(FlagValue::Int(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FlagValue, E> {
        Ok(i64::try_from(v).map_or(FlagValue::Float(v as f64), FlagValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FlagValue, E> {
        Ok(FlagValue::Float(v))
    }

    // YAML 1.2 loaders hand `yes`/`no` over as strings.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<FlagValue, E> {
        Ok(parse_bool(v).map_or_else(|| FlagValue::Str(v.to_owned()), FlagValue::Bool))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FlagValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(FlagValue::List(items))
    }
}

impl<'de> Deserialize<'de> for FlagValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlagValueVisitor)
    }
}
