//! Attribute writes sent to the directory

use serde::{Deserialize, Serialize};

/// A single attribute value. Most are text; `unicodePwd` is binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Binary(Vec<u8>),
}

impl AttrValue {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttrValue::Text(s) => s.as_bytes(),
            AttrValue::Binary(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Binary(_) => None,
        }
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Text(n.to_string())
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(b: Vec<u8>) -> Self {
        AttrValue::Binary(b)
    }
}

/// Replace-style modification of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub attribute: String,
    pub values: Vec<AttrValue>,
}

impl Modification {
    pub fn replace(attribute: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn replace_all(attribute: impl Into<String>, values: Vec<AttrValue>) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn is(&self, attribute: &str) -> bool {
        self.attribute.eq_ignore_ascii_case(attribute)
    }

    /// First value as text, if any
    pub fn text(&self) -> Option<&str> {
        self.values.first().and_then(|v| v.as_text())
    }
}

/// Attribute list for a new directory object
pub type NewEntry = Vec<(String, Vec<AttrValue>)>;
