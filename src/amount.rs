use std::str::FromStr;

use rust_decimal::Decimal;

/// Currency glyphs which may prefix an amount on a statement.
pub const CURRENCY_SYMBOLS: [char; 4] = ['₦', '$', '€', '£'];

/// Same glyphs, for use inside a regex character class.
pub(crate) const CURRENCY_CLASS: &str = "₦$€£";

/// Parses an amount token such as `₦150,000.00` or `$ 12.5`.
///
/// Returns `None` when the token isn't a number or isn't strictly positive.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let cleaned: String = token
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    let amount = Decimal::from_str(&cleaned).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}
