//! Display units for byte counts.

use core::fmt;

/// Unit a byte count is expressed in.
///
/// Decimal units (`KB`, `MB`, `GB`) use powers of 1000, binary units
/// (`KiB`, `MiB`, `GiB`) use powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    #[cfg_attr(feature = "serde", serde(rename = "B", alias = "Bytes"))]
    Bytes,
    KB,
    KiB,
    MB,
    #[default]
    MiB,
    GB,
    GiB,
}

impl Unit {
    /// All units, smallest first.
    pub const ALL: [Unit; 7] = [
        Unit::Bytes,
        Unit::KB,
        Unit::KiB,
        Unit::MB,
        Unit::MiB,
        Unit::GB,
        Unit::GiB,
    ];

    /// Number of bytes in one of this unit.
    pub const fn factor(&self) -> u64 {
        match self {
            Unit::Bytes => 1,
            Unit::KB => 1_000,
            Unit::KiB => 1_024,
            Unit::MB => 1_000_000,
            Unit::MiB => 1_048_576,
            Unit::GB => 1_000_000_000,
            Unit::GiB => 1_073_741_824,
        }
    }

    /// Short symbol appended to readings ("B", "KiB", ...).
    pub const fn symbol(&self) -> &'static str {
        match self {
            Unit::Bytes => "B",
            Unit::KB => "KB",
            Unit::KiB => "KiB",
            Unit::MB => "MB",
            Unit::MiB => "MiB",
            Unit::GB => "GB",
            Unit::GiB => "GiB",
        }
    }

    /// Parse a unit symbol, ignoring ASCII case.
    ///
    /// `"bytes"` is accepted as a spelling of `B`.
    pub fn parse(s: &str) -> Option<Unit> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("bytes") {
            return Some(Unit::Bytes);
        }
        Unit::ALL
            .into_iter()
            .find(|unit| unit.symbol().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors() {
        assert_eq!(Unit::Bytes.factor(), 1);
        assert_eq!(Unit::KB.factor(), 1000);
        assert_eq!(Unit::KiB.factor(), 1024);
        assert_eq!(Unit::MB.factor(), 1_000_000);
        assert_eq!(Unit::MiB.factor(), 1024 * 1024);
        assert_eq!(Unit::GB.factor(), 1_000_000_000);
        assert_eq!(Unit::GiB.factor(), 1024 * 1024 * 1024);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Unit::parse("mib"), Some(Unit::MiB));
        assert_eq!(Unit::parse("MIB"), Some(Unit::MiB));
        assert_eq!(Unit::parse("kb"), Some(Unit::KB));
        assert_eq!(Unit::parse("Gib"), Some(Unit::GiB));
        assert_eq!(Unit::parse("b"), Some(Unit::Bytes));
        assert_eq!(Unit::parse("Bytes"), Some(Unit::Bytes));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(Unit::parse("TiB"), None);
        assert_eq!(Unit::parse(""), None);
        assert_eq!(Unit::parse("megabytes"), None);
    }

    #[test]
    fn default_is_mebibytes() {
        assert_eq!(Unit::default(), Unit::MiB);
    }

    #[test]
    fn symbol_round_trips_through_parse() {
        for unit in Unit::ALL {
            assert_eq!(Unit::parse(unit.symbol()), Some(unit));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_symbols() {
        assert_eq!(serde_json::to_string(&Unit::Bytes).unwrap(), "\"B\"");
        assert_eq!(serde_json::to_string(&Unit::KiB).unwrap(), "\"KiB\"");

        let parsed: Unit = serde_json::from_str("\"Bytes\"").unwrap();
        assert_eq!(parsed, Unit::Bytes);
        let parsed: Unit = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(parsed, Unit::Bytes);

        assert!(serde_json::from_str::<Unit>("\"TiB\"").is_err());
    }
}
