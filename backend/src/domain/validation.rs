//! Field parsing shared by the entity services.
//!
//! Form input arrives as raw text; these helpers trim it and turn it into typed values
//! or a [`ValidationError`] naming the offending field.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::errors::ValidationError;

/// Trimmed value of a required field
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Trimmed value of an optional field, `None` when blank
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Required integer within an inclusive range
pub fn integer_in_range<T>(
    field: &'static str,
    value: &str,
    min: T,
    max: T,
) -> Result<T, ValidationError>
where
    T: FromStr + PartialOrd + Copy + Into<i64>,
{
    let parsed: T = required(field, value)?
        .parse()
        .map_err(|_| ValidationError::NotANumber { field })?;

    if parsed < min || parsed > max {
        return Err(ValidationError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(parsed)
}

/// Optional integer within an inclusive range, `None` when blank
pub fn optional_integer_in_range<T>(
    field: &'static str,
    value: &str,
    min: T,
    max: T,
) -> Result<Option<T>, ValidationError>
where
    T: FromStr + PartialOrd + Copy + Into<i64>,
{
    if value.trim().is_empty() {
        return Ok(None);
    }
    integer_in_range(field, value, min, max).map(Some)
}

pub fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Monetary amount: non-negative, at most two decimal places, at most `max`
pub fn amount(value: &str, max: Decimal) -> Result<Decimal, ValidationError> {
    let raw = required("amount", value)?.replace(',', ".");
    let parsed = Decimal::from_str(&raw).map_err(|_| ValidationError::AmountNotANumber)?;

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(ValidationError::NegativeAmount);
    }
    if parsed.normalize().scale() > 2 {
        return Err(ValidationError::AmountPrecision);
    }
    if parsed > max {
        return Err(ValidationError::AmountTooLarge { max });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("make", "  Lada ").unwrap(), "Lada");
        assert_eq!(
            required("make", "   "),
            Err(ValidationError::MissingField("make"))
        );
    }

    #[test]
    fn test_integer_in_range_boundaries() {
        assert_eq!(integer_in_range("mileage", "0", 0u32, 999_999).unwrap(), 0);
        assert_eq!(
            integer_in_range("mileage", "999999", 0u32, 999_999).unwrap(),
            999_999
        );
        assert_eq!(
            integer_in_range("mileage", "1000000", 0u32, 999_999),
            Err(ValidationError::OutOfRange {
                field: "mileage",
                min: 0,
                max: 999_999
            })
        );
        assert_eq!(
            integer_in_range("mileage", "-1", 0u32, 999_999),
            Err(ValidationError::NotANumber { field: "mileage" })
        );
        assert_eq!(
            integer_in_range("year", "1899", 1900i32, 2100),
            Err(ValidationError::OutOfRange {
                field: "year",
                min: 1900,
                max: 2100
            })
        );
    }

    #[test]
    fn test_optional_integer_in_range() {
        assert_eq!(optional_integer_in_range("house", "", 0u32, 9999).unwrap(), None);
        assert_eq!(
            optional_integer_in_range("house", " 12 ", 0u32, 9999).unwrap(),
            Some(12)
        );
        assert_eq!(
            optional_integer_in_range("house", "12a", 0u32, 9999),
            Err(ValidationError::NotANumber { field: "house" })
        );
        assert_eq!(
            optional_integer_in_range("house", "10000", 0u32, 9999),
            Err(ValidationError::OutOfRange {
                field: "house",
                min: 0,
                max: 9999
            })
        );
    }

    #[test]
    fn test_amount_rules() {
        let max = dec!(9999999.99);
        assert_eq!(amount("1500", max).unwrap(), dec!(1500));
        assert_eq!(amount("12,50", max).unwrap(), dec!(12.50));
        assert_eq!(amount("9999999.99", max).unwrap(), max);
        assert_eq!(amount("0", max).unwrap(), dec!(0));
        assert_eq!(amount("abc", max), Err(ValidationError::AmountNotANumber));
        assert_eq!(amount("-5", max), Err(ValidationError::NegativeAmount));
        assert_eq!(amount("1.005", max), Err(ValidationError::AmountPrecision));
        assert_eq!(
            amount("10000000", max),
            Err(ValidationError::AmountTooLarge { max })
        );
        assert_eq!(amount("", max), Err(ValidationError::MissingField("amount")));
    }
}
