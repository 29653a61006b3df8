//! The DBF field catalog: field definitions, name sanitization and
//! collision resolution, and the validation matrix from §3/§4.5.

pub mod codec;

use crate::error::{Error, Result};

pub const MAX_FIELD_COUNT: usize = 255;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Date,
    Logical,
    Memo,
    Numeric,
    Float,
}

impl FieldType {
    pub fn from_char(c: char) -> Result<FieldType> {
        Ok(match c {
            'C' => FieldType::Character,
            'D' => FieldType::Date,
            'L' => FieldType::Logical,
            'M' => FieldType::Memo,
            'N' => FieldType::Numeric,
            'F' => FieldType::Float,
            other => return Err(Error::FieldTypeNotValid(other)),
        })
    }

    pub fn to_char(self) -> char {
        match self {
            FieldType::Character => 'C',
            FieldType::Date => 'D',
            FieldType::Logical => 'L',
            FieldType::Memo => 'M',
            FieldType::Numeric => 'N',
            FieldType::Float => 'F',
        }
    }
}

/// One entry in the field catalog: (name, type, size, decimals), already
/// validated and sanitized per §4.5.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub size: u8,
    pub decimals: u8,
}

impl Field {
    fn validate(field_type: FieldType, size: u8, decimals: u8, allow_size_255: bool) -> Result<()> {
        let size_ok = match field_type {
            FieldType::Character | FieldType::Numeric | FieldType::Float => {
                (1..=254).contains(&size) || (allow_size_255 && size == 255)
            }
            FieldType::Date => size == 8,
            FieldType::Logical => size == 1,
            FieldType::Memo => size == 10,
        };
        if !size_ok {
            return Err(Error::FieldSizeNotValid {
                field_type: field_type.to_char(),
                size,
            });
        }
        let decimals_ok = match field_type {
            FieldType::Numeric | FieldType::Float => decimals as u32 + 2 <= size as u32,
            _ => decimals == 0,
        };
        if !decimals_ok {
            return Err(Error::FieldDecimalsNotValid { size, decimals });
        }
        Ok(())
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_` and truncates
/// to 10 characters. Case folding to upper-case is applied separately,
/// when the all-caps option is on.
fn sanitize_base(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut cleaned = replaced.trim_matches('_').to_string();
    cleaned.truncate(10);
    if cleaned.is_empty() {
        cleaned.push('_');
    }
    cleaned
}

/// The ordered set of field definitions for one dataset, plus the state
/// needed to enforce §4.5's invariants (255-field cap, uniqueness,
/// post-initialization immutability).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fields: Vec<Field>,
    all_caps: bool,
    initialized: bool,
    allow_field_size_255: bool,
}

impl Catalog {
    pub fn new(all_caps: bool) -> Catalog {
        Catalog {
            fields: Vec::new(),
            all_caps,
            initialized: false,
            allow_field_size_255: false,
        }
    }

    /// Tolerates a 255-byte field size when reading a dataset whose DBF
    /// header declares one, per §4.8's "custom allowed field size 255"
    /// reader option.
    pub fn allow_field_size_255(mut self, allow: bool) -> Catalog {
        self.allow_field_size_255 = allow;
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn has_memo_field(&self) -> bool {
        self.fields.iter().any(|f| f.field_type == FieldType::Memo)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn find(&self, name: &str) -> Option<&Field> {
        let key = self.normalize_lookup(name);
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(&key))
    }

    fn normalize_lookup(&self, name: &str) -> String {
        if self.all_caps {
            name.to_ascii_uppercase()
        } else {
            name.to_string()
        }
    }

    /// Sanitizes `name`, validates `(field_type, size, decimals)`, and
    /// inserts the new field, preserving insertion order.
    pub fn add_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        size: u8,
        decimals: u8,
    ) -> Result<&Field> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        if self.fields.len() >= MAX_FIELD_COUNT {
            return Err(Error::MaxFieldCountReached);
        }
        Field::validate(field_type, size, decimals, self.allow_field_size_255)?;

        let resolved = self.resolve_name(name)?;

        self.fields.push(Field {
            name: resolved,
            field_type,
            size,
            decimals,
        });
        Ok(self.fields.last().unwrap())
    }

    fn name_taken(&self, candidate: &str) -> bool {
        self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(candidate))
    }

    fn resolve_name(&self, name: &str) -> Result<String> {
        let mut candidate = sanitize_base(name);
        if self.all_caps {
            candidate = candidate.to_ascii_uppercase();
        }
        if !self.name_taken(&candidate) {
            return Ok(candidate);
        }
        let mut stem = candidate.clone();
        stem.truncate(8);
        for n in 1..=99 {
            let suffixed = format!("{}_{}", stem, n);
            if !self.name_taken(&suffixed) {
                return Ok(suffixed);
            }
        }
        Err(Error::FieldNameNotValid(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_and_resolves_collisions() {
        let mut catalog = Catalog::new(true);
        catalog.add_field("name!", FieldType::Character, 10, 0).unwrap();
        catalog.add_field("NAME?", FieldType::Character, 10, 0).unwrap();
        catalog
            .add_field("name-three", FieldType::Character, 10, 0)
            .unwrap();
        catalog
            .add_field("name-three", FieldType::Character, 10, 0)
            .unwrap();

        let names: Vec<&str> = catalog.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["NAME", "NAME_1", "NAME_THREE", "NAME_THR_1"]);
    }

    #[test]
    fn exhausting_ninety_nine_collisions_fails() {
        let mut catalog = Catalog::new(false);
        catalog.add_field("x", FieldType::Character, 5, 0).unwrap();
        for _ in 0..99 {
            catalog.add_field("x", FieldType::Character, 5, 0).unwrap();
        }
        assert!(matches!(
            catalog.add_field("x", FieldType::Character, 5, 0),
            Err(Error::FieldNameNotValid(_))
        ));
    }

    #[test]
    fn rejects_add_field_after_initialization() {
        let mut catalog = Catalog::new(false);
        catalog.add_field("a", FieldType::Character, 5, 0).unwrap();
        catalog.mark_initialized();
        let err = catalog.add_field("b", FieldType::Character, 5, 0);
        assert!(matches!(err, Err(Error::AlreadyInitialized)));
    }

    #[test]
    fn caps_total_field_count() {
        let mut catalog = Catalog::new(false);
        for i in 0..MAX_FIELD_COUNT {
            catalog
                .add_field(&format!("f{}", i), FieldType::Character, 5, 0)
                .unwrap();
        }
        assert!(matches!(
            catalog.add_field("overflow", FieldType::Character, 5, 0),
            Err(Error::MaxFieldCountReached)
        ));
    }

    #[test]
    fn validates_numeric_decimals_against_size() {
        assert!(Field::validate(FieldType::Numeric, 3, 2, false).is_err());
        assert!(Field::validate(FieldType::Numeric, 4, 2, false).is_ok());
    }

    #[test]
    fn size_255_rejected_unless_relaxed() {
        let mut strict = Catalog::new(false);
        assert!(matches!(
            strict.add_field("BIG", FieldType::Character, 255, 0),
            Err(Error::FieldSizeNotValid { .. })
        ));

        let mut relaxed = Catalog::new(false).allow_field_size_255(true);
        assert!(relaxed.add_field("BIG", FieldType::Character, 255, 0).is_ok());
    }
}
