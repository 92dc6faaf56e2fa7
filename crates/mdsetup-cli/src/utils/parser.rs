use thiserror::Error;

pub const MIN_DPI: f64 = 100.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' is not an integer")]
    InvalidInteger(String),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

fn integer(value: &str) -> Result<i64, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidInteger(value.to_string()))
}

fn number(value: &str) -> Result<f64, ParseError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(value.to_string()))
}

/// Integer clamped to a minimum of 1.
pub fn at_least_one(value: &str) -> Result<usize, ParseError> {
    Ok(integer(value)?.max(1) as usize)
}

/// Integer clamped to a minimum of 0.
pub fn non_negative(value: &str) -> Result<usize, ParseError> {
    Ok(integer(value)?.max(0) as usize)
}

/// Number clamped to a minimum of 1.0.
pub fn at_least_one_f64(value: &str) -> Result<f64, ParseError> {
    Ok(number(value)?.max(1.0))
}

/// Figure resolution clamped to a minimum of [`MIN_DPI`].
pub fn dpi(value: &str) -> Result<f64, ParseError> {
    Ok(number(value)?.max(MIN_DPI))
}
