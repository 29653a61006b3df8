use std::collections::BTreeMap;

use chrono::NaiveDate;

/// The value of one DBF field on one record, already decoded from its
/// fixed-width wire encoding (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Character(String),
    Numeric(f64),
    Logical(bool),
    Date(NaiveDate),
    /// A memo field's decoded text (the DBT indirection has already been
    /// followed).
    Memo(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Character(s) | AttributeValue::Memo(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// The per-record field-name to value dictionary. Preserves insertion
/// order for stable round-tripping into a structured array, while still
/// offering map-style lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDict {
    order: Vec<String>,
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeDict {
    pub fn new() -> AttributeDict {
        AttributeDict::default()
    }

    pub fn get(&self, field: &str) -> Option<&AttributeValue> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: &str, value: AttributeValue) {
        if !self.values.contains_key(field) {
            self.order.push(field.to_string());
        }
        self.values.insert(field.to_string(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.values.get(name).unwrap()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
