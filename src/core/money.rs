use rust_decimal::{Decimal, RoundingStrategy};

/// Round a USD amount to two decimal places (cents), half away from zero.
///
/// # Examples
///
/// ```
/// use fx_reconcile::core::money::round_usd;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_usd(dec!(10.005)), dec!(10.01));
/// assert_eq!(round_usd(dec!(-10.005)), dec!(-10.01));
/// ```
pub fn round_usd(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a JPY amount to an integer number of yen, half away from zero.
///
/// JPY has no minor unit in practice; every reported yen figure is whole.
///
/// # Examples
///
/// ```
/// use fx_reconcile::core::money::round_jpy;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_jpy(dec!(5512.5)), dec!(5513));
/// assert_eq!(round_jpy(dec!(-0.4)), dec!(0));
/// ```
pub fn round_jpy(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_usd_half_up() {
        assert_eq!(round_usd(dec!(1.005)), dec!(1.01));
        assert_eq!(round_usd(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn test_round_usd_negative() {
        assert_eq!(round_usd(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_round_jpy_whole_yen() {
        assert_eq!(round_jpy(dec!(110000.5)), dec!(110001));
        assert_eq!(round_jpy(dec!(110000.49)), dec!(110000));
        assert_eq!(round_jpy(dec!(-2.5)), dec!(-3));
    }

    #[test]
    fn test_round_is_idempotent() {
        let once = round_jpy(dec!(123.456));
        assert_eq!(round_jpy(once), once);
        let once = round_usd(dec!(123.456));
        assert_eq!(round_usd(once), once);
    }
}
