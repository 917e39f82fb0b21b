//! Digit grouping separators.

use core::fmt;

/// Separator inserted between groups of three digits.
///
/// `None` means digits run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupingSeparator {
    #[cfg_attr(feature = "serde", serde(rename = ","))]
    Comma,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Hyphen,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = " "))]
    Space,
    #[cfg_attr(feature = "serde", serde(rename = ""))]
    None,
}

impl GroupingSeparator {
    /// The literal text inserted between digit groups.
    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupingSeparator::Comma => ",",
            GroupingSeparator::Hyphen => "-",
            GroupingSeparator::Space => " ",
            GroupingSeparator::None => "",
        }
    }

    /// Parse a separator token. Only the exact tokens `,` `-` ` ` and the
    /// empty string are recognised; nothing is trimmed.
    pub fn parse(s: &str) -> Option<GroupingSeparator> {
        match s {
            "," => Some(GroupingSeparator::Comma),
            "-" => Some(GroupingSeparator::Hyphen),
            " " => Some(GroupingSeparator::Space),
            "" => Some(GroupingSeparator::None),
            _ => None,
        }
    }
}

impl fmt::Display for GroupingSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
