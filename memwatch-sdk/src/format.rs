//! Byte count to human-readable reading conversion.
//!
//! The rules, in order:
//!
//! 1. Divide by the unit factor.
//! 2. A quotient strictly greater than 1 is rounded to the nearest integer
//!    (halves round away from zero). Anything else is rendered with exactly
//!    three fractional digits, so a quotient of exactly 1 reads `1.000`.
//! 3. Values above 999 get the grouping separator every three digits.
//! 4. The unit symbol is appended after a space if enabled.

use memwatch_types::{Configuration, Unit};

use crate::error::FormatError;

/// Format a signed byte count.
///
/// Returns [`FormatError::NegativeByteCount`] for negative input. Use
/// [`format_bytes`] when the count is already unsigned.
///
/// # Example
///
/// ```rust
/// use memwatch_sdk::format::format_reading;
/// use memwatch_sdk::{Configuration, Unit};
///
/// let config = Configuration::default().with_unit(Unit::MB).with_show_unit(false);
/// assert_eq!(format_reading(500_000, &config).unwrap(), "0.500");
/// assert!(format_reading(-1, &config).is_err());
/// ```
pub fn format_reading(byte_count: i64, config: &Configuration) -> Result<String, FormatError> {
    let bytes = u64::try_from(byte_count).map_err(|_| FormatError::NegativeByteCount(byte_count))?;
    Ok(format_bytes(bytes, config))
}

/// Format an unsigned byte count. Never fails.
pub fn format_bytes(byte_count: u64, config: &Configuration) -> String {
    let (mut reading, value) = scale(byte_count, config.unit);

    if value > 999.0 {
        reading = group_digits(&reading, config.separator.as_str());
    }

    if config.show_unit {
        reading.push(' ');
        reading.push_str(config.unit.symbol());
    }

    reading
}

/// Returns the rendered number and its numeric value.
fn scale(byte_count: u64, unit: Unit) -> (String, f64) {
    // Whole bytes need no float round-trip.
    if unit == Unit::Bytes {
        return if byte_count > 1 {
            (byte_count.to_string(), byte_count as f64)
        } else {
            (format!("{byte_count}.000"), byte_count as f64)
        };
    }

    let quotient = byte_count as f64 / unit.factor() as f64;
    if quotient > 1.0 {
        let rounded = quotient.round();
        (format!("{rounded:.0}"), rounded)
    } else {
        (format!("{quotient:.3}"), quotient)
    }
}

/// Insert `separator` between every group of three digits, counting from
/// the right. Non-digit characters are dropped.
fn group_digits(number: &str, separator: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());

    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(*digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use memwatch_types::GroupingSeparator;

    fn config(unit: Unit, show_unit: bool, separator: GroupingSeparator) -> Configuration {
        Configuration::default()
            .with_unit(unit)
            .with_show_unit(show_unit)
            .with_separator(separator)
    }

    #[test]
    fn quotient_of_exactly_one_keeps_three_decimals() {
        let c = config(Unit::MiB, true, GroupingSeparator::Space);
        assert_eq!(format_bytes(1_048_576, &c), "1.000 MiB");
    }

    #[test]
    fn quotient_above_one_rounds_to_integer() {
        // 1.5e9 / 2^30 ~= 1.397
        let c = config(Unit::GiB, false, GroupingSeparator::Space);
        assert_eq!(format_bytes(1_500_000_000, &c), "1");
    }

    #[test]
    fn quotient_below_one_has_three_decimals() {
        let c = config(Unit::MB, false, GroupingSeparator::Space);
        assert_eq!(format_bytes(500_000, &c), "0.500");
    }

    #[test]
    fn zero_is_not_an_error() {
        let c = config(Unit::MiB, true, GroupingSeparator::Comma);
        assert_eq!(format_bytes(0, &c), "0.000 MiB");
        assert_eq!(format_reading(0, &c).unwrap(), "0.000 MiB");
    }

    #[test]
    fn negative_input_is_rejected() {
        let c = Configuration::default();
        assert_eq!(
            format_reading(-42, &c),
            Err(FormatError::NegativeByteCount(-42))
        );
    }

    #[test]
    fn grouping_with_hyphen() {
        let c = config(Unit::Bytes, false, GroupingSeparator::Hyphen);
        assert_eq!(format_bytes(1_234_567, &c), "1-234-567");
    }

    #[test]
    fn empty_separator_means_no_grouping() {
        let c = config(Unit::Bytes, false, GroupingSeparator::None);
        assert_eq!(format_bytes(1_234_567, &c), "1234567");
    }

    #[test]
    fn grouping_starts_above_999() {
        let c = config(Unit::Bytes, false, GroupingSeparator::Comma);
        assert_eq!(format_bytes(999, &c), "999");
        assert_eq!(format_bytes(1000, &c), "1,000");
        assert_eq!(format_bytes(123_456, &c), "123,456");
        assert_eq!(format_bytes(1_000_000, &c), "1,000,000");
    }

    #[test]
    fn rounding_can_cross_into_grouping() {
        // 999.5 KB rounds half up to 1000.
        let c = config(Unit::KB, false, GroupingSeparator::Space);
        assert_eq!(format_bytes(999_500, &c), "1 000");
        assert_eq!(format_bytes(999_499, &c), "999");
    }

    #[test]
    fn halves_round_up() {
        let c = config(Unit::KB, false, GroupingSeparator::None);
        assert_eq!(format_bytes(1_500, &c), "2");
        assert_eq!(format_bytes(2_500, &c), "3");
    }

    #[test]
    fn single_byte_takes_fractional_branch() {
        let c = config(Unit::Bytes, true, GroupingSeparator::Space);
        assert_eq!(format_bytes(1, &c), "1.000 B");
        assert_eq!(format_bytes(2, &c), "2 B");
    }

    #[test]
    fn largest_value_is_exact_in_bytes() {
        let c = config(Unit::Bytes, false, GroupingSeparator::Space);
        assert_eq!(
            format_bytes(u64::MAX, &c),
            "18 446 744 073 709 551 615"
        );
    }

    #[test]
    fn largest_value_in_other_units_does_not_panic() {
        for unit in Unit::ALL {
            let c = config(unit, true, GroupingSeparator::Comma);
            let reading = format_bytes(u64::MAX, &c);
            assert!(reading.ends_with(unit.symbol()));
        }
    }

    #[test]
    fn suffix_uses_unit_symbol() {
        let c = config(Unit::KiB, true, GroupingSeparator::Space);
        assert_eq!(format_bytes(10 * 1024, &c), "10 KiB");

        let c = config(Unit::Bytes, true, GroupingSeparator::Space);
        assert_eq!(format_bytes(512, &c), "512 B");
    }

    #[test]
    fn typical_resident_memory() {
        let c = Configuration::default();
        assert_eq!(format_bytes(512 * 1024 * 1024, &c), "512 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024, &c), "3 072 MiB");
    }

    #[test]
    fn group_digits_helper() {
        assert_eq!(group_digits("1234", ","), "1,234");
        assert_eq!(group_digits("123", ","), "123");
        assert_eq!(group_digits("12345678", " "), "12 345 678");
        assert_eq!(group_digits("1234", ""), "1234");
    }
}
