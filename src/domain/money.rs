use std::fmt;

/// Money is carried as binary floating point, matching how shares are
/// produced and stored. `per_person_share * n` may drift from `amount` by
/// a rounding error; callers compare with a tolerance.
pub type Amount = f64;

/// Tolerance used when comparing amounts that went through a division.
pub const AMOUNT_EPSILON: Amount = 1e-9;

/// Split `amount` evenly among the people in `split_between`.
/// An empty split yields 0 instead of dividing by zero.
pub fn per_person_share<S: AsRef<str>>(amount: Amount, split_between: &[S]) -> Amount {
    if split_between.is_empty() {
        0.0
    } else {
        amount / split_between.len() as Amount
    }
}

/// Format an amount for display with two fractional digits.
/// Example: 300.0 -> "300.00", -33.333 -> "-33.33"
pub fn format_amount(amount: Amount) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    // Avoid printing "-0.00" for tiny negative residues.
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", rounded)
}

/// Parse a plain decimal string into an amount.
/// Example: "50.00" -> 50.0, "12.5" -> 12.5, ".5" -> 0.5
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let digits = input.strip_prefix('-').unwrap_or(input);
    let valid = digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());
    if !valid {
        return Err(ParseAmountError::InvalidFormat);
    }

    let amount: Amount = input
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)?;
    if !amount.is_finite() {
        return Err(ParseAmountError::InvalidFormat);
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
