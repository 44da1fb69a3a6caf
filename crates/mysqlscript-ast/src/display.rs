//! Tree dumps used by tooling and tests.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::query::NodeRef;

/// Words after which [`build_sql`] starts a new line.
const LINE_BREAK_WORDS: &[&str] = &["begin", "end", ";"];

/// Serialisable mirror of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

pub fn to_json(node: NodeRef<'_>) -> JsonNode {
    JsonNode {
        name: node.symbol().name().into_owned(),
        value: node.value().map(str::to_owned),
        begin: node.begin(),
        end: node.end(),
        children: node.children().map(to_json).collect(),
    }
}

/// `<elem name='…' value='…'>…</elem>` dump of a subtree.
pub fn dump_xml(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    write_xml(node, &mut out);
    out
}

fn write_xml(node: NodeRef<'_>, out: &mut String) {
    let symbol = node.symbol();
    out.push_str("<elem name='");
    push_escaped(out, &symbol.name());
    out.push('\'');
    if let Some(value) = node.value().filter(|v| !v.is_empty()) {
        out.push_str(" value='");
        push_escaped(out, value);
        out.push('\'');
    }
    out.push('>');
    for child in node.children() {
        write_xml(child, out);
    }
    out.push_str("</elem>");
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

/// Rebuild approximate SQL from terminal values.
///
/// Values are joined by single spaces, with a line break after `BEGIN`,
/// `END` and `;`. The output is for display only; original spacing and
/// quoting are lost.
pub fn build_sql(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    write_sql(node, &mut out);
    out
}

fn write_sql(node: NodeRef<'_>, out: &mut String) {
    if let Some(value) = node.value().filter(|v| !v.is_empty()) {
        out.push_str(value);
        let breaks = LINE_BREAK_WORDS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(value));
        out.push(if breaks { '\n' } else { ' ' });
    }
    for child in node.children() {
        write_sql(child, out);
    }
}

/// Terminal values of the subtree joined by `delim`, depth first.
pub fn subitems_as_string(node: NodeRef<'_>, delim: &str) -> String {
    let mut out = String::new();
    let mut sep = "";
    for child in node.children() {
        out.push_str(sep);
        sep = delim;
        if child.child_count() > 0 {
            out.push_str(&subitems_as_string(child, delim));
        } else {
            out.push_str(child.value().unwrap_or_default());
        }
    }
    out
}

/// Indented one-node-per-line outline, handy in test failure messages.
pub fn outline(node: NodeRef<'_>) -> String {
    fn walk(node: NodeRef<'_>, depth: usize, out: &mut String) {
        let _ = write!(out, "{:indent$}{}", "", node.symbol(), indent = depth * 2);
        if let Some(value) = node.value() {
            let _ = write!(out, " {value:?}");
        }
        out.push('\n');
        for child in node.children() {
            walk(child, depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(node, 0, &mut out);
    out
}
