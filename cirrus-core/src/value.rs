//! Property values and references
//!
//! Resource properties form a small closed value tree. References are kept as
//! an indirection marker (`{"Ref": name}` in the rendered document) and are
//! resolved by CloudFormation at apply time, never locally. The `Base64` and
//! `Join` intrinsics exist so a boot script can interleave opaque shell text
//! with references; the text itself is never parsed.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

/// A by-name indirection, resolved remotely at apply time.
///
/// References minted from a handle remember which document minted them so a
/// handle from another template instance can be rejected. Pseudo-parameter
/// references (`AWS::StackName`, `AWS::Region`, ...) belong to no document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Logical name of the parameter or resource being referenced
    pub target: String,
    /// Id of the document that minted this reference, if any
    pub document: Option<Uuid>,
}

impl Reference {
    /// True for `AWS::*` pseudo-parameters, which exist in every document
    pub fn is_pseudo(&self) -> bool {
        self.target.starts_with("AWS::")
    }
}

/// Attribute value of a resource property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
    /// Reference to a parameter or resource, rendered as `{"Ref": name}`
    Ref(Reference),
    /// `Fn::Base64` intrinsic
    Base64(Box<PropertyValue>),
    /// `Fn::Join` intrinsic (delimiter, parts)
    Join(String, Vec<PropertyValue>),
}

impl PropertyValue {
    /// Reference to an `AWS::*` pseudo-parameter
    pub fn pseudo(name: impl Into<String>) -> Self {
        Self::Ref(Reference {
            target: name.into(),
            document: None,
        })
    }

    pub fn base64(inner: PropertyValue) -> Self {
        Self::Base64(Box::new(inner))
    }

    pub fn join(delimiter: impl Into<String>, parts: Vec<PropertyValue>) -> Self {
        Self::Join(delimiter.into(), parts)
    }

    /// Build a `Map` value from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Render to the CloudFormation JSON shape
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => json!(s),
            PropertyValue::Int(i) => json!(i),
            PropertyValue::Bool(b) => json!(b),
            PropertyValue::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            PropertyValue::Map(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json());
                }
                serde_json::Value::Object(object)
            }
            PropertyValue::Ref(reference) => json!({ "Ref": reference.target }),
            PropertyValue::Base64(inner) => json!({ "Fn::Base64": inner.to_json() }),
            PropertyValue::Join(delimiter, parts) => {
                let parts: Vec<serde_json::Value> = parts.iter().map(|v| v.to_json()).collect();
                json!({ "Fn::Join": [delimiter, parts] })
            }
        }
    }

    /// Collect every reference in this value tree
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a Reference>) {
        match self {
            PropertyValue::Ref(reference) => out.push(reference),
            PropertyValue::List(items) | PropertyValue::Join(_, items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            PropertyValue::Map(map) => {
                for value in map.values() {
                    value.collect_refs(out);
                }
            }
            PropertyValue::Base64(inner) => inner.collect_refs(out),
            _ => {}
        }
    }

    /// Concatenate every string literal in this value tree.
    ///
    /// Used to inspect boot-script payloads without parsing them.
    pub fn literal_text(&self, out: &mut String) {
        match self {
            PropertyValue::String(s) => out.push_str(s),
            PropertyValue::List(items) | PropertyValue::Join(_, items) => {
                for item in items {
                    item.literal_text(out);
                }
            }
            PropertyValue::Map(map) => {
                for value in map.values() {
                    value.literal_text(out);
                }
            }
            PropertyValue::Base64(inner) => inner.literal_text(out),
            _ => {}
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_renders_as_marker_object() {
        let value = PropertyValue::pseudo("AWS::Region");
        assert_eq!(value.to_json(), json!({ "Ref": "AWS::Region" }));
    }

    #[test]
    fn test_join_renders_as_intrinsic() {
        let value = PropertyValue::join(
            "",
            vec!["a".into(), PropertyValue::pseudo("AWS::StackName")],
        );
        assert_eq!(
            value.to_json(),
            json!({ "Fn::Join": ["", ["a", { "Ref": "AWS::StackName" }]] })
        );
    }

    #[test]
    fn test_collect_refs_walks_nested_values() {
        let value = PropertyValue::base64(PropertyValue::join(
            "",
            vec![
                "#!/bin/bash\n".into(),
                PropertyValue::pseudo("AWS::StackName"),
                PropertyValue::List(vec![PropertyValue::pseudo("AWS::Region")]),
            ],
        ));
        let mut refs = Vec::new();
        value.collect_refs(&mut refs);
        let targets: Vec<&str> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["AWS::StackName", "AWS::Region"]);
    }

    #[test]
    fn test_literal_text_skips_refs() {
        let value = PropertyValue::join(
            "",
            vec![
                "cfn-signal -e 0 --stack ".into(),
                PropertyValue::pseudo("AWS::StackName"),
            ],
        );
        let mut text = String::new();
        value.literal_text(&mut text);
        assert_eq!(text, "cfn-signal -e 0 --stack ");
    }
}
