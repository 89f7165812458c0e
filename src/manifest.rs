// manifest.rs - Document model and XML encoding

use crate::entry::EntryKind;
use crate::error::{ParseError, SerializationError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_ELEMENT: &str = "manifest";

/// Label → value mapping collected from an edit form.
pub type FieldMap = HashMap<String, String>;

/// Value for `label`, empty when the form had no such field.
fn field(fields: &FieldMap, label: &str) -> String {
    fields.get(label).cloned().unwrap_or_default()
}

/// A whole repo manifest: one default block, remotes, projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "manifest")]
pub struct Manifest {
    #[serde(default)]
    pub default: DefaultBlock,
    #[serde(rename = "remote", default)]
    pub remotes: Vec<Remote>,
    #[serde(rename = "project", default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBlock {
    #[serde(rename = "@sync-j", default, skip_serializing_if = "String::is_empty")]
    pub sync_j: String,
    #[serde(rename = "@revision", default, skip_serializing_if = "String::is_empty")]
    pub revision: String,
    #[serde(rename = "@remote", default, skip_serializing_if = "String::is_empty")]
    pub remote: String,
    #[serde(rename = "@dest-branch", default, skip_serializing_if = "String::is_empty")]
    pub dest_branch: String,
}

impl DefaultBlock {
    pub fn get(&self, label: &str) -> Option<&str> {
        let value = match label {
            "sync-j" => &self.sync_j,
            "revision" => &self.revision,
            "remote" => &self.remote,
            "dest-branch" => &self.dest_branch,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Build a complete block from form values. Missing labels become empty.
    pub fn from_fields(fields: &FieldMap) -> Self {
        DefaultBlock {
            sync_j: field(fields, "sync-j"),
            revision: field(fields, "revision"),
            remote: field(fields, "remote"),
            dest_branch: field(fields, "dest-branch"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    #[serde(rename = "@name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "@fetch", default, skip_serializing_if = "String::is_empty")]
    pub fetch: String,
    #[serde(rename = "@revision", default, skip_serializing_if = "String::is_empty")]
    pub revision: String,
    #[serde(rename = "@upstream", default, skip_serializing_if = "String::is_empty")]
    pub upstream: String,
    #[serde(rename = "@review", default, skip_serializing_if = "String::is_empty")]
    pub review: String,
}

impl Remote {
    pub fn get(&self, label: &str) -> Option<&str> {
        let value = match label {
            "name" => &self.name,
            "fetch" => &self.fetch,
            "revision" => &self.revision,
            "upstream" => &self.upstream,
            "review" => &self.review,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn from_fields(fields: &FieldMap) -> Self {
        Remote {
            name: field(fields, "name"),
            fetch: field(fields, "fetch"),
            revision: field(fields, "revision"),
            upstream: field(fields, "upstream"),
            review: field(fields, "review"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "@name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "@path", default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(rename = "@remote", default, skip_serializing_if = "String::is_empty")]
    pub remote: String,
    #[serde(rename = "@revision", default, skip_serializing_if = "String::is_empty")]
    pub revision: String,
    #[serde(rename = "@upstream", default, skip_serializing_if = "String::is_empty")]
    pub upstream: String,
    #[serde(rename = "@groups", default, skip_serializing_if = "String::is_empty")]
    pub groups: String,
    #[serde(rename = "@dest-branch", default, skip_serializing_if = "String::is_empty")]
    pub dest_branch: String,
}

impl Project {
    pub fn get(&self, label: &str) -> Option<&str> {
        let value = match label {
            "name" => &self.name,
            "path" => &self.path,
            "remote" => &self.remote,
            "revision" => &self.revision,
            "upstream" => &self.upstream,
            "groups" => &self.groups,
            "dest-branch" => &self.dest_branch,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn from_fields(fields: &FieldMap) -> Self {
        Project {
            name: field(fields, "name"),
            path: field(fields, "path"),
            remote: field(fields, "remote"),
            revision: field(fields, "revision"),
            upstream: field(fields, "upstream"),
            groups: field(fields, "groups"),
            dest_branch: field(fields, "dest-branch"),
        }
    }
}

/// A parsed document plus the source content it has no place for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub manifest: Manifest,
    /// Skipped elements, attributes and comments, sorted and deduplicated.
    /// None of it is written back on save.
    pub dropped: Vec<String>,
}

/// Parse manifest XML into a document.
///
/// Unknown elements and attributes are skipped. `<remote>` and `<project>`
/// elements may be interleaved; each keeps its relative order.
pub fn parse(text: &str) -> Result<Manifest, ParseError> {
    parse_report(text).map(|parsed| parsed.manifest)
}

/// Like [`parse`], also listing what the document model skipped.
pub fn parse_report(text: &str) -> Result<Parsed, ParseError> {
    let dropped = scan(text)?;
    let manifest = quick_xml::de::from_str(text).map_err(|e| ParseError {
        message: e.to_string(),
    })?;
    Ok(Parsed { manifest, dropped })
}

/// Render a document as indented manifest XML. Empty attributes are omitted.
pub fn serialize(manifest: &Manifest) -> Result<String, SerializationError> {
    let mut body = String::new();
    let mut ser = quick_xml::se::Serializer::new(&mut body);
    ser.indent(' ', 2);
    manifest.serialize(ser).map_err(|e| SerializationError {
        message: e.to_string(),
    })?;
    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

/// Attributes the model keeps for a top-level element, `None` if the
/// element itself is not modelled.
fn known_attributes(element: &str) -> Option<&'static [&'static str]> {
    match element {
        "default" => Some(EntryKind::Default.schema()),
        "remote" => Some(EntryKind::Remote.schema()),
        "project" => Some(EntryKind::Project.schema()),
        _ => None,
    }
}

/// Event pass over the raw XML: checks the root element and collects what
/// the model does not hold.
fn scan(text: &str) -> Result<Vec<String>, ParseError> {
    let mut reader = Reader::from_str(text);
    let mut dropped = BTreeSet::new();
    // Open elements, each flagged with whether the model keeps it
    let mut open: Vec<(String, bool)> = Vec::new();
    let mut seen_root = false;
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(ParseError {
                    message: format!(
                        "malformed XML at byte {}: {}",
                        reader.buffer_position(),
                        e
                    ),
                });
            }
        };
        match event {
            Event::Start(e) => {
                let kept = visit_element(&e, &open, &mut dropped)?;
                open.push((element_name(&e), kept));
                seen_root = true;
            }
            Event::Empty(e) => {
                visit_element(&e, &open, &mut dropped)?;
                seen_root = true;
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Comment(_) => {
                dropped.insert("comments".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !seen_root {
        return Err(ParseError {
            message: "document has no root element".to_string(),
        });
    }
    Ok(dropped.into_iter().collect())
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Record what is lost from one element. Returns whether the model keeps it.
fn visit_element(
    e: &BytesStart,
    open: &[(String, bool)],
    dropped: &mut BTreeSet<String>,
) -> Result<bool, ParseError> {
    let name = element_name(e);
    let known: Option<&[&str]> = match open.last() {
        None if name == ROOT_ELEMENT => Some(&[]),
        None => {
            return Err(ParseError {
                message: format!("expected <{}> root element, found <{}>", ROOT_ELEMENT, name),
            });
        }
        // Inside content that is already reported
        Some((_, false)) => None,
        Some((parent, true)) => {
            let known = if open.len() == 1 {
                known_attributes(&name)
            } else {
                None
            };
            if known.is_none() {
                if open.len() == 1 {
                    dropped.insert(format!("<{}>", name));
                } else {
                    dropped.insert(format!("<{}> in <{}>", name, parent));
                }
            }
            known
        }
    };

    let Some(known) = known else {
        return Ok(false);
    };
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !known.contains(&key.as_str()) {
            dropped.insert(format!("{} on <{}>", key, name));
        }
    }
    Ok(true)
}
