//! DBF string transcoding, abstracted behind a two-function interface so
//! the rest of the crate is independent of the specific conversion
//! library (`encoding_rs`) used underneath.

use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// The declared charset of a DBF dataset. Defaults to ISO-8859-1, the
/// classic dBase III default; overridable from a CPG sidecar file.
#[derive(Debug, Clone)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Default for Charset {
    fn default() -> Charset {
        Charset {
            encoding: encoding_rs::WINDOWS_1252,
        }
    }
}

impl Charset {
    /// Looks up a charset by the name a CPG file would contain (e.g.
    /// `"UTF-8"`, `"ISO-8859-1"`, `"GBK"`).
    pub fn from_cpg_name(name: &str) -> Result<Charset> {
        let trimmed = name.trim();
        let encoding = Encoding::for_label(trimmed.as_bytes())
            .ok_or_else(|| Error::DbfCharsetConversion(format!("unknown charset {trimmed:?}")))?;
        Ok(Charset { encoding })
    }

    pub fn cpg_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decodes DBF wire bytes into a UTF-8 `String`.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, _) = self.encoding.decode(bytes);
        text.into_owned()
    }

    /// Encodes a UTF-8 string into this charset's wire representation.
    /// Fails if any character cannot be represented in the target
    /// encoding.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            return Err(Error::DbfCharsetConversion(format!(
                "{text:?} is not representable in {}",
                self.encoding.name()
            )));
        }
        Ok(bytes.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ascii() {
        let cs = Charset::default();
        let bytes = cs.encode("abc").unwrap();
        assert_eq!(cs.decode(&bytes), "abc");
    }

    #[test]
    fn rejects_unrepresentable_characters() {
        let cs = Charset::from_cpg_name("ISO-8859-1").unwrap();
        assert!(cs.encode("\u{4e2d}").is_err());
    }
}
