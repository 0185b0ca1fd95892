//! Recursive schema walk producing a value tree.

use std::io::{BufRead, Write};

use colored::Colorize;
use serde_json::{Map, Value};

use crate::{
    error::Result,
    prompt::Prompter,
    schema::{SchemaNode, Section},
};

/// Turn a snake_case key into a header title, e.g. `storage_providers` -> `Storage Providers`.
///
/// Every letter that follows a non-letter starts a new word, so `ab3cd` becomes `Ab3Cd`.
pub fn title_case(key: &str) -> String {
    let mut title = String::with_capacity(key.len());
    let mut in_word = false;
    for c in key.chars() {
        if c == '_' {
            title.push(' ');
            in_word = false;
        } else if c.is_alphabetic() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }
    title
}

/// Header line printed before descending into a nested section.
pub fn section_header(key: &str) -> String {
    format!("\n--- Setting up {} ---", title_case(key))
}

/// Prompt for every leaf of `schema` in declared order.
///
/// Sections become JSON objects keyed like the schema, leaves become scalars.
pub fn walk<R: BufRead, W: Write>(schema: &SchemaNode, prompter: &mut Prompter<R, W>) -> Result<Value> {
    walk_node(schema, "", prompter)
}

fn walk_node<R: BufRead, W: Write>(
    node: &SchemaNode,
    path: &str,
    prompter: &mut Prompter<R, W>,
) -> Result<Value> {
    match node {
        SchemaNode::Section(section) => walk_section(section, path, prompter),
        SchemaNode::Leaf(leaf) => {
            debug!("prompt `{path}` ({})", leaf.kind);
            let value = prompter.ask(&leaf.prompt, leaf.default.as_ref(), leaf.kind)?;
            Ok(value.as_json())
        }
    }
}

fn walk_section<R: BufRead, W: Write>(
    section: &Section,
    path: &str,
    prompter: &mut Prompter<R, W>,
) -> Result<Value> {
    let mut map = Map::new();
    for (key, child) in section.children() {
        let child_path = if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        };
        if matches!(child, SchemaNode::Section(_)) {
            prompter.say(section_header(key).cyan().bold())?;
        }
        let value = walk_node(child, &child_path, prompter)?;
        map.insert(key.to_string(), value);
    }
    Ok(Value::Object(map))
}
