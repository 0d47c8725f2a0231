use rust_decimal::Decimal;
use thiserror::Error;

/// Rejection of user input before anything reaches the record store.
///
/// The presentation layer shows these as warnings; every other failure is an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Fill in all required fields: {0} is missing")]
    MissingField(&'static str),

    #[error("{field} must be a whole number")]
    NotANumber { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("Plate number cannot be longer than {max} characters")]
    PlateTooLong { max: usize },

    #[error("A car with plate number {0} already exists")]
    DuplicatePlate(String),

    #[error("Phone number must contain exactly {expected} digits")]
    PhoneLength { expected: usize },

    #[error("Phone number must contain digits only")]
    PhoneNotDigits,

    #[error("Licence series must contain exactly 4 digits")]
    LicenseSeries,

    #[error("Licence number must contain exactly 6 digits")]
    LicenseNumber,

    #[error("Amount must be a number")]
    AmountNotANumber,

    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount can have at most two decimal places")]
    AmountPrecision,

    #[error("Amount cannot exceed {max}")]
    AmountTooLarge { max: Decimal },

    #[error("Unknown {kind}: {id}")]
    UnknownReference { kind: &'static str, id: i64 },

    #[error("Enter a search query")]
    EmptySearchQuery,
}
