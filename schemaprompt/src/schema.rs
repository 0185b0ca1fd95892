//! Schema model: sections, leaves and scalar types.
//!
//! A schema is a tree whose inner nodes are [`Section`]s and whose leaves are
//! [`Leaf`] prompts. The distinction is fixed when the tree is built, either
//! through the builder methods or once by [`SchemaNode::try_from`] when loading
//! a JSON description.

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::error::{CoercionError, SchemaError};

/// Truthy tokens accepted for boolean input, compared case-insensitively.
pub const TRUTHY_TOKENS: [&str; 5] = ["yes", "y", "true", "t", "1"];

/// Scalar types a leaf can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Free text.
    Str,
    /// Signed 64-bit integer.
    Int,
    /// Boolean, parsed leniently.
    Bool,
}

impl ScalarType {
    /// Schema tag of the type.
    pub fn tag(self) -> &'static str {
        match self {
            ScalarType::Str => "str",
            ScalarType::Int => "int",
            ScalarType::Bool => "bool",
        }
    }

    /// Convert a raw input line into a value of this type.
    ///
    /// Booleans never fail: anything outside [`TRUTHY_TOKENS`] is `false`.
    /// Integers tolerate surrounding whitespace.
    pub fn coerce(self, raw: &str) -> Result<ScalarValue, CoercionError> {
        match self {
            ScalarType::Str => Ok(ScalarValue::Str(raw.to_string())),
            ScalarType::Int => raw
                .trim()
                .parse::<i64>()
                .map(ScalarValue::Int)
                .map_err(|_| CoercionError {
                    expected: self,
                    raw: raw.to_string(),
                }),
            ScalarType::Bool => {
                let lower = raw.to_lowercase();
                Ok(ScalarValue::Bool(TRUTHY_TOKENS.contains(&lower.as_str())))
            }
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(ScalarType::Str),
            "int" => Ok(ScalarType::Int),
            "bool" => Ok(ScalarType::Bool),
            other => Err(other.to_string()),
        }
    }
}

/// A collected or default leaf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ScalarValue {
    /// The type of this value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Str(_) => ScalarType::Str,
            ScalarValue::Int(_) => ScalarType::Int,
            ScalarValue::Bool(_) => ScalarType::Bool,
        }
    }

    /// Serialize the value into a JSON scalar.
    pub fn as_json(&self) -> Value {
        match self {
            ScalarValue::Str(s) => Value::String(s.clone()),
            ScalarValue::Int(i) => Value::Number((*i).into()),
            ScalarValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Str(s) => f.write_str(s),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Str(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Str(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// A single prompt producing one scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Text shown to the operator.
    pub prompt: String,
    /// Value used when the operator enters an empty line.
    pub default: Option<ScalarValue>,
    /// Declared type of the collected value.
    pub kind: ScalarType,
}

impl Leaf {
    /// Leaf without a default.
    pub fn new(prompt: impl Into<String>, kind: ScalarType) -> Self {
        Self {
            prompt: prompt.into(),
            default: None,
            kind,
        }
    }

    /// String leaf with a default.
    pub fn string(prompt: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            default: Some(ScalarValue::Str(default.into())),
            kind: ScalarType::Str,
        }
    }

    /// Integer leaf with a default.
    pub fn integer(prompt: impl Into<String>, default: i64) -> Self {
        Self {
            prompt: prompt.into(),
            default: Some(ScalarValue::Int(default)),
            kind: ScalarType::Int,
        }
    }

    /// Boolean leaf with a default.
    pub fn boolean(prompt: impl Into<String>, default: bool) -> Self {
        Self {
            prompt: prompt.into(),
            default: Some(ScalarValue::Bool(default)),
            kind: ScalarType::Bool,
        }
    }
}

/// Ordered group of named child nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    children: Vec<(String, SchemaNode)>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child, replacing an existing child with the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<SchemaNode>) {
        let key = key.into();
        let node = node.into();
        if let Some(idx) = self.children.iter().position(|(k, _)| *k == key) {
            self.children[idx].1 = node;
        } else {
            self.children.push((key, node));
        }
    }

    /// Builder form of [`Section::insert`] for a leaf.
    pub fn leaf(mut self, key: impl Into<String>, leaf: Leaf) -> Self {
        self.insert(key, leaf);
        self
    }

    /// Builder form of [`Section::insert`] for a nested section.
    pub fn section(mut self, key: impl Into<String>, section: Section) -> Self {
        self.insert(key, section);
        self
    }

    /// Children in declared order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node of a configuration schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Section(Section),
    Leaf(Leaf),
}

impl SchemaNode {
    /// Look up a node by dot-separated path, e.g. `storage_providers.s3.bucket`.
    pub fn get_by_key(&self, key: &str) -> Option<&SchemaNode> {
        if key.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for part in key.split('.') {
            match node {
                SchemaNode::Section(section) => node = section.get(part)?,
                SchemaNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Build the value tree that an all-defaults run would produce.
    ///
    /// Leaves without a default become `null`.
    pub fn defaults(&self) -> Value {
        match self {
            SchemaNode::Section(section) => Value::Object(
                section
                    .children()
                    .map(|(k, v)| (k.to_string(), v.defaults()))
                    .collect(),
            ),
            SchemaNode::Leaf(leaf) => leaf
                .default
                .as_ref()
                .map(ScalarValue::as_json)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<Leaf> for SchemaNode {
    fn from(value: Leaf) -> Self {
        SchemaNode::Leaf(value)
    }
}

impl From<Section> for SchemaNode {
    fn from(value: Section) -> Self {
        SchemaNode::Section(value)
    }
}

impl TryFrom<&Value> for SchemaNode {
    type Error = SchemaError;

    /// Parse a JSON schema description.
    ///
    /// An object is a leaf iff it has a `prompt` key; `type` defaults to
    /// `str` and `default` may be absent or `null`.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        parse_node(value, "")
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode, SchemaError> {
    let Value::Object(map) = value else {
        return Err(SchemaError::NotAnObject {
            path: path.to_string(),
            actual: value.to_string(),
        });
    };

    if let Some(prompt) = map.get("prompt") {
        let prompt = prompt
            .as_str()
            .ok_or_else(|| SchemaError::InvalidPrompt {
                path: path.to_string(),
            })?
            .to_string();

        let kind = match map.get("type") {
            None => ScalarType::Str,
            Some(Value::String(tag)) => {
                tag.parse::<ScalarType>()
                    .map_err(|tag| SchemaError::UnknownType {
                        path: path.to_string(),
                        tag,
                    })?
            }
            Some(other) => {
                return Err(SchemaError::UnknownType {
                    path: path.to_string(),
                    tag: other.to_string(),
                });
            }
        };

        let default = match map.get("default") {
            None | Some(Value::Null) => None,
            Some(v) => Some(parse_default(v, kind, path)?),
        };

        return Ok(SchemaNode::Leaf(Leaf {
            prompt,
            default,
            kind,
        }));
    }

    let mut section = Section::new();
    for (key, child) in map {
        section.insert(key.clone(), parse_node(child, &join_path(path, key))?);
    }
    Ok(SchemaNode::Section(section))
}

fn parse_default(value: &Value, kind: ScalarType, path: &str) -> Result<ScalarValue, SchemaError> {
    let parsed = match (kind, value) {
        (ScalarType::Str, Value::String(s)) => Some(ScalarValue::Str(s.clone())),
        (ScalarType::Int, Value::Number(n)) => n.as_i64().map(ScalarValue::Int),
        (ScalarType::Bool, Value::Bool(b)) => Some(ScalarValue::Bool(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| SchemaError::TypeMismatch {
        path: path.to_string(),
        expected: kind,
        actual: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_coercion_truthy_tokens() {
        for raw in ["yes", "Y", "TRUE", "t", "1", "YeS"] {
            assert_eq!(
                ScalarType::Bool.coerce(raw),
                Ok(ScalarValue::Bool(true)),
                "{raw}"
            );
        }
        for raw in ["no", "n", "false", "0", "maybe", "yess", " yes"] {
            assert_eq!(
                ScalarType::Bool.coerce(raw),
                Ok(ScalarValue::Bool(false)),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(ScalarType::Int.coerce("8"), Ok(ScalarValue::Int(8)));
        assert_eq!(ScalarType::Int.coerce(" -12 "), Ok(ScalarValue::Int(-12)));
        let err = ScalarType::Int.coerce("abc").unwrap_err();
        assert_eq!(err.expected, ScalarType::Int);
        assert_eq!(err.to_string(), "'abc' is not a valid int");
        assert!(ScalarType::Int.coerce("1.5").is_err());
    }

    #[test]
    fn test_str_coercion_is_verbatim() {
        assert_eq!(
            ScalarType::Str.coerce("  spaced  "),
            Ok(ScalarValue::Str("  spaced  ".into()))
        );
    }

    #[test]
    fn test_section_insert_replaces_in_place() {
        let section = Section::new()
            .leaf("a", Leaf::integer("A", 1))
            .leaf("b", Leaf::integer("B", 2))
            .leaf("a", Leaf::integer("A again", 3));
        let keys: Vec<_> = section.children().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(section.get("a"), Some(&SchemaNode::from(Leaf::integer("A again", 3))));
    }

    #[test]
    fn test_get_by_key() {
        let root: SchemaNode = Section::new()
            .section("outer", Section::new().leaf("x", Leaf::boolean("X?", true)))
            .into();
        assert!(matches!(
            root.get_by_key("outer.x"),
            Some(SchemaNode::Leaf(Leaf { kind: ScalarType::Bool, .. }))
        ));
        assert!(root.get_by_key("outer.x.y").is_none());
        assert!(root.get_by_key("missing").is_none());
    }

    #[test]
    fn test_defaults_tree() {
        let root: SchemaNode = Section::new()
            .section(
                "net",
                Section::new()
                    .leaf("host", Leaf::string("Host", "localhost"))
                    .leaf("port", Leaf::integer("Port", 8080)),
            )
            .leaf("token", Leaf::new("Token", ScalarType::Str))
            .into();
        assert_eq!(
            root.defaults(),
            json!({"net": {"host": "localhost", "port": 8080}, "token": null})
        );
    }

    #[test]
    fn test_parse_schema_from_json() {
        let raw = json!({
            "server": {
                "host": {"prompt": "Host", "default": "localhost"},
                "port": {"prompt": "Port", "default": 22, "type": "int"},
                "tls": {"prompt": "TLS?", "type": "bool", "default": null}
            }
        });
        let node = SchemaNode::try_from(&raw).unwrap();
        assert_eq!(
            node.get_by_key("server.host"),
            Some(&SchemaNode::from(Leaf::string("Host", "localhost")))
        );
        assert_eq!(
            node.get_by_key("server.port"),
            Some(&SchemaNode::from(Leaf::integer("Port", 22)))
        );
        assert_eq!(
            node.get_by_key("server.tls"),
            Some(&SchemaNode::from(Leaf::new("TLS?", ScalarType::Bool)))
        );
    }

    #[test]
    fn test_parse_schema_errors() {
        let unknown = json!({"a": {"prompt": "A", "type": "float"}});
        assert_eq!(
            SchemaNode::try_from(&unknown),
            Err(SchemaError::UnknownType {
                path: "a".into(),
                tag: "float".into()
            })
        );

        let mismatch = json!({"s": {"b": {"prompt": "B", "type": "int", "default": "x"}}});
        assert!(matches!(
            SchemaNode::try_from(&mismatch),
            Err(SchemaError::TypeMismatch { path, expected: ScalarType::Int, .. }) if path == "s.b"
        ));

        let scalar = json!({"a": 3});
        assert!(matches!(
            SchemaNode::try_from(&scalar),
            Err(SchemaError::NotAnObject { path, .. }) if path == "a"
        ));

        let prompt = json!({"a": {"prompt": 7}});
        assert_eq!(
            SchemaNode::try_from(&prompt),
            Err(SchemaError::InvalidPrompt { path: "a".into() })
        );
    }
}
