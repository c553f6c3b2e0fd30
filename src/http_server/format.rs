//! # Response Formats
//!
//! Serializes projected rows as JSON or XML. The format is chosen by the
//! path extension (`people_groups.json`, `countries.xml`).

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::filter::ResourceName;
use crate::store::Row;

/// Serializer for a list of rows
pub trait ResponseFormat: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self, resource: ResourceName, rows: &[Row]) -> String;

    fn respond(&self, resource: ResourceName, rows: &[Row]) -> Response {
        (
            [(header::CONTENT_TYPE, self.content_type())],
            self.render(resource, rows),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ResponseFormat for JsonFormat {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, _resource: ResourceName, rows: &[Row]) -> String {
        Value::Array(rows.iter().cloned().map(Value::Object).collect()).to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormat;

impl ResponseFormat for XmlFormat {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn render(&self, resource: ResourceName, rows: &[Row]) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let root = resource.as_str();
        let item = record_element(resource);

        out.push_str(&format!("<{}>", root));
        for row in rows {
            out.push_str(&format!("<{}>", item));
            for (name, value) in row {
                write_element(&mut out, &element_name(name), value);
            }
            out.push_str(&format!("</{}>", item));
        }
        out.push_str(&format!("</{}>", root));
        out
    }
}

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    pub fn formatter(&self) -> &'static dyn ResponseFormat {
        match self {
            Format::Json => &JsonFormat,
            Format::Xml => &XmlFormat,
        }
    }
}

/// Split `name.ext` into its stem and format
///
/// No extension means JSON. An unknown extension yields `None`.
pub fn split_format(segment: &str) -> Option<(&str, Format)> {
    match segment.rsplit_once('.') {
        Some((stem, ext)) => Format::from_extension(ext).map(|format| (stem, format)),
        None => Some((segment, Format::Json)),
    }
}

fn record_element(resource: ResourceName) -> &'static str {
    match resource {
        ResourceName::PeopleGroups | ResourceName::DailyUnreached => "people_group",
        ResourceName::Countries => "country",
        ResourceName::Languages => "language",
        ResourceName::Regions => "region",
        ResourceName::Continents => "continent",
    }
}

/// Column name made safe as an XML tag
fn element_name(name: &str) -> String {
    let mut tag: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if tag.is_empty() || tag.starts_with(|c: char| c.is_ascii_digit()) {
        tag.insert(0, '_');
    }
    tag
}

fn write_element(out: &mut String, tag: &str, value: &Value) {
    match value {
        Value::Null => out.push_str(&format!("<{}/>", tag)),
        Value::Array(items) => {
            out.push_str(&format!("<{}>", tag));
            for item in items {
                write_element(out, "item", item);
            }
            out.push_str(&format!("</{}>", tag));
        }
        Value::Object(map) => {
            out.push_str(&format!("<{}>", tag));
            for (name, inner) in map {
                write_element(out, &element_name(name), inner);
            }
            out.push_str(&format!("</{}>", tag));
        }
        Value::String(s) => out.push_str(&format!("<{}>{}</{}>", tag, escape_xml(s), tag)),
        other => out.push_str(&format!("<{}>{}</{}>", tag, other, tag)),
    }
}

/// Escape text content
fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c if c.is_control() && c != '\n' && c != '\t' && c != '\r' => {}
            c => result.push(c),
        }
    }
    result
}
