//! Three-part SQL fragment template.

use std::fmt;

/// A textual SQL sub-expression made of `left center right`.
///
/// Blocks are the currency of the DSL: operators such as [`crate::ops::eq`] return one,
/// and custom clause fragments (`DISTINCT`, `FOR UPDATE`, `UNION (...)`) are stored as one.
/// Rendering joins the non-empty parts with single spaces.
///
/// No validation is performed; a malformed fragment surfaces as a database syntax error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Block {
    left: String,
    center: String,
    right: String,
}

impl Block {
    /// Create a block from its three parts.
    pub fn new(left: impl Into<String>, center: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            center: center.into(),
            right: right.into(),
        }
    }

    /// Create a block with an empty center, e.g. `Block::pair("nickname", "IS NULL")`.
    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(left, "", right)
    }

    /// Wrap verbatim SQL text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, "", "")
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn center(&self) -> &str {
        &self.center
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// Rendered SQL text.
    pub fn statement(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in [&self.left, &self.center, &self.right] {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for Block {
    fn from(text: &str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for Block {
    fn from(text: String) -> Self {
        Self::raw(text)
    }
}

/// Anything that stringifies into a condition or field fragment.
///
/// Raw strings and [`Block`]s are accepted interchangeably by the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for Fragment {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<Block> for Fragment {
    fn from(b: Block) -> Self {
        Self(b.to_string())
    }
}

impl From<&Block> for Fragment {
    fn from(b: &Block) -> Self {
        Self(b.to_string())
    }
}
