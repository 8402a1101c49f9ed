use crate::error::CoreError;
use crate::relationship::Relationship;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One person in a hierarchy returned by the hierarchy endpoint.
///
/// The tree is immutable once fetched. Children sit behind `Arc` so view-side
/// wrappers can hold onto records without copying subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonNode {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub relationship_with_qt: Relationship,
    #[serde(default)]
    pub representative_from_qt: Option<String>,
    #[serde(default, deserialize_with = "children_or_empty")]
    pub children: Vec<Arc<PersonNode>>,
}

/// Nested nodes whose `children` is missing or not an array are treated as leaves.
fn children_or_empty<'de, D>(deserializer: D) -> Result<Vec<Arc<PersonNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value::<PersonNode>(item).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

impl PersonNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: String::new(),
            department: String::new(),
            country: String::new(),
            location: String::new(),
            photo_url: String::new(),
            relationship_with_qt: Relationship::None,
            representative_from_qt: None,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: PersonNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationship_with_qt = relationship;
        self
    }

    pub fn with_representative(mut self, representative: impl Into<String>) -> Self {
        self.representative_from_qt = Some(representative.into());
        self
    }

    /// Validate a hierarchy payload before deserializing it.
    ///
    /// The root must be a JSON object with a `children` field; `null` means the
    /// server had nothing for the requested person.
    pub fn from_json_value(value: Value) -> Result<Self, CoreError> {
        match &value {
            Value::Null => return Err(CoreError::MissingHierarchy),
            Value::Object(map) if !map.contains_key("children") => {
                return Err(CoreError::MalformedHierarchy(
                    "root has no children field".to_string(),
                ));
            }
            Value::Object(_) => {}
            other => {
                return Err(CoreError::MalformedHierarchy(format!(
                    "expected an object, got {}",
                    json_kind(other)
                )));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Location shown to users; empty locations read as "Unknown".
    pub fn display_location(&self) -> &str {
        if self.location.is_empty() {
            "Unknown"
        } else {
            &self.location
        }
    }

    /// Pre-order walk over this node and every descendant.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn subtree_size(&self) -> usize {
        self.walk().count()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a PersonNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PersonNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| child.as_ref()));
        Some(node)
    }
}

/// Flat directory entry as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub ldap: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default, alias = "location_input")]
    pub location: String,
    #[serde(default, alias = "moma_photo_url")]
    pub photo_url: String,
    #[serde(default)]
    pub relationship_with_qt: Relationship,
    #[serde(default)]
    pub representative_from_qt: Option<String>,
}

impl EmployeeRecord {
    pub fn display_location(&self) -> &str {
        if self.location.is_empty() {
            "Unknown"
        } else {
            &self.location
        }
    }

    /// Hierarchy node for this record, without children.
    pub fn to_person_node(&self) -> PersonNode {
        PersonNode {
            name: self.name.clone(),
            position: self.position.clone(),
            department: self.department.clone(),
            country: self.country.clone(),
            location: self.location.clone(),
            photo_url: self.photo_url.clone(),
            relationship_with_qt: self.relationship_with_qt,
            representative_from_qt: self.representative_from_qt.clone(),
            children: Vec::new(),
        }
    }
}

/// Everyone in a hierarchy who shares one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBucket {
    pub location: String,
    pub count: usize,
    pub people: Vec<EmployeeRecord>,
    #[serde(default)]
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_value_rejects_null_root() {
        let err = PersonNode::from_json_value(Value::Null).expect_err("null root");
        assert!(matches!(err, CoreError::MissingHierarchy));
    }

    #[test]
    fn test_from_json_value_requires_children_on_root() {
        let err = PersonNode::from_json_value(json!({ "name": "Alice" }))
            .expect_err("root without children");
        assert!(matches!(err, CoreError::MalformedHierarchy(_)));

        let err = PersonNode::from_json_value(json!(["Alice"])).expect_err("array root");
        assert!(matches!(err, CoreError::MalformedHierarchy(_)));
    }

    #[test]
    fn test_nested_children_default_to_empty() {
        let node = PersonNode::from_json_value(json!({
            "name": "Alice",
            "relationship_with_qt": "direct",
            "children": [
                { "name": "Bob" },
                { "name": "Carol", "children": "not a list" },
            ],
        }))
        .expect("valid hierarchy");

        assert_eq!(node.relationship_with_qt, Relationship::Direct);
        assert_eq!(node.children.len(), 2);
        assert!(node.children.iter().all(|child| child.children.is_empty()));
        assert_eq!(node.children[1].relationship_with_qt, Relationship::None);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = PersonNode::new("Alice")
            .with_child(PersonNode::new("Bob"))
            .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave")))
            .with_child(PersonNode::new("Erin"));

        let names: Vec<_> = tree.walk().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dave", "Erin"]);
        assert_eq!(tree.subtree_size(), 5);
    }

    #[test]
    fn test_employee_record_accepts_source_aliases() {
        let record: EmployeeRecord = serde_json::from_value(json!({
            "name": "Emma Wilson",
            "position": "Senior Software Engineer",
            "department": "Engineering",
            "country": "UK",
            "location_input": "London",
            "moma_photo_url": "https://example.com/photos/ewilson.jpg",
            "relationship_with_qt": "Indirect",
            "representative_from_qt": "Mike",
        }))
        .expect("record");

        assert_eq!(record.location, "London");
        assert_eq!(record.photo_url, "https://example.com/photos/ewilson.jpg");
        assert_eq!(record.to_person_node().representative_from_qt.as_deref(), Some("Mike"));
    }
}
