//! Immutable text values

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Immutable Unicode text.
///
/// Whether the text needs any JSON escaping is decided once, at
/// construction, so the emitter can copy escape-free text verbatim.
#[derive(Clone)]
pub struct Text {
    text: Rc<str>,
    needs_escape: bool,
}

impl Text {
    /// Create text from a string.
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        let text = text.into();
        let needs_escape = text
            .bytes()
            .any(|b| b < 0x20 || b >= 0x80 || b == b'"' || b == b'\\');
        Self { text, needs_escape }
    }

    /// Decode UTF-8, replacing invalid sequences with U+FFFD.
    pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
        match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(s) => Self::new(s),
            Cow::Owned(s) => {
                tracing::warn!(len = bytes.len(), "invalid UTF-8 replaced in text");
                Self::new(s)
            }
        }
    }

    /// Decode bytes one-to-one as code points U+0000..=U+00FF.
    pub fn from_latin1(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().map(|&b| char::from(b)).collect::<String>())
    }

    /// Decode a legacy byte string: UTF-8 when valid, Latin-1 otherwise.
    pub fn from_legacy(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(s) => Self::new(s),
            Err(_) => Self::from_latin1(bytes),
        }
    }

    /// The text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether JSON output of this text needs escaping.
    pub fn needs_escape(&self) -> bool {
        self.needs_escape
    }

    /// Check whether two texts share an allocation.
    pub fn ptr_eq(&self, other: &Text) -> bool {
        Rc::ptr_eq(&self.text, &other.text)
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
