//! Price display helpers.

/// Currency symbol shown in front of every price.
pub const CURRENCY: &str = "₹";

/// Unit prices are quoted in (1 lakh = 100,000 rupees).
pub const PRICE_UNIT: &str = "Lakh";

/// Rupees per lakh.
pub const RUPEES_PER_LAKH: f64 = 100_000.0;

/// Groups digits the Indian way: the last three, then pairs
/// (`12,34,567`).
#[must_use]
pub fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// Rounds the magnitude of `value` to a whole number.
///
/// The price model can emit negative values; the magnitude is displayed.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_magnitude(value: f64) -> u64 {
    if value.is_finite() {
        value.abs().round() as u64
    } else {
        0
    }
}

/// `₹43 Lakh` style price.
#[must_use]
pub fn lakh_price(value: f64) -> String {
    format!(
        "{CURRENCY}{} {PRICE_UNIT}",
        group_indian(whole_magnitude(value))
    )
}

/// `₹42.5 Lakh` style price for a stored value, shown as saved.
#[must_use]
pub fn stored_lakh_price(value: f64) -> String {
    format!("{CURRENCY}{value} {PRICE_UNIT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_small_numbers_unchanged() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(43), "43");
        assert_eq!(group_indian(999), "999");
    }

    #[test]
    fn groups_lakhs_and_crores() {
        assert_eq!(group_indian(1_000), "1,000");
        assert_eq!(group_indian(100_000), "1,00,000");
        assert_eq!(group_indian(1_234_567), "12,34,567");
        assert_eq!(group_indian(123_456_789), "12,34,56,789");
    }

    #[test]
    fn negative_price_shows_rounded_magnitude() {
        assert_eq!(lakh_price(-42.5), "₹43 Lakh");
        assert_eq!(lakh_price(1520.4), "₹1,520 Lakh");
    }

    #[test]
    fn stored_price_keeps_fraction() {
        assert_eq!(stored_lakh_price(42.5), "₹42.5 Lakh");
        assert_eq!(stored_lakh_price(80.0), "₹80 Lakh");
    }

    #[test]
    fn non_finite_price_is_zero() {
        assert_eq!(whole_magnitude(f64::NAN), 0);
    }
}
