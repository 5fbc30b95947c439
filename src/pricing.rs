//! Order splitting and commission math.
//!
//! Every amount is an exact [`Decimal`], so a line's vendor payout and the
//! platform commission always add back up to `price * quantity` without any
//! floating point drift.

use rust_decimal::Decimal;

/// Platform cut of every order line, in percent.
pub const COMMISSION_PERCENT: u32 = 5;

/// Prices are kept to cents; anything finer is rounded away on input.
pub const PRICE_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(14, 4)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

pub fn commission_rate() -> Decimal {
    Decimal::new(COMMISSION_PERCENT as i64, 2)
}

/// One cart line as priced at checkout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    pub product_id: i32,
    pub vendor_id: i32,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSplit {
    pub product_id: i32,
    pub vendor_id: i32,
    pub price: Decimal,
    pub quantity: i32,
    pub item_total: Decimal,
    pub admin_commission: Decimal,
    pub vendor_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSplit {
    pub lines: Vec<LineSplit>,
    pub total_amount: Decimal,
    pub admin_commission: Decimal,
}

impl OrderSplit {
    pub fn vendor_total(&self) -> Decimal {
        self.lines.iter().map(|l| l.vendor_amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Quantity for product {0} must be at least 1")]
    InvalidQuantity(i32),
    #[error("Price for product {0} must not be negative")]
    NegativePrice(i32),
    #[error("Order amount is too large")]
    AmountTooLarge,
}

/// `Some(amount)` only when it fits a money column.
pub fn within_range(amount: Decimal) -> Option<Decimal> {
    (amount <= MAX_AMOUNT).then_some(amount)
}

/// Normalize a client supplied price to cents.
pub fn normalize_price(price: Decimal) -> Decimal {
    price.round_dp(PRICE_SCALE)
}

pub fn split_line(line: LineInput) -> Result<LineSplit, PricingError> {
    if line.quantity < 1 {
        return Err(PricingError::InvalidQuantity(line.product_id));
    }
    if line.price < Decimal::ZERO {
        return Err(PricingError::NegativePrice(line.product_id));
    }

    let price = within_range(normalize_price(line.price)).ok_or(PricingError::AmountTooLarge)?;
    let item_total = price
        .checked_mul(Decimal::from(line.quantity))
        .and_then(within_range)
        .ok_or(PricingError::AmountTooLarge)?;
    let admin_commission = item_total
        .checked_mul(commission_rate())
        .ok_or(PricingError::AmountTooLarge)?;
    let vendor_amount = item_total - admin_commission;

    Ok(LineSplit {
        product_id: line.product_id,
        vendor_id: line.vendor_id,
        price,
        quantity: line.quantity,
        item_total,
        admin_commission,
        vendor_amount,
    })
}

/// Price a whole cart. Order totals are the sums of the per-line values.
pub fn split_order(lines: &[LineInput]) -> Result<OrderSplit, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let lines = lines
        .iter()
        .copied()
        .map(split_line)
        .collect::<Result<Vec<_>, _>>()?;

    let total_amount = checked_sum(lines.iter().map(|l| l.item_total))?;
    let admin_commission = checked_sum(lines.iter().map(|l| l.admin_commission))?;

    Ok(OrderSplit {
        lines,
        total_amount,
        admin_commission,
    })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, PricingError> {
    amounts
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .and_then(within_range)
        .ok_or(PricingError::AmountTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i32, price: Decimal, quantity: i32) -> LineInput {
        LineInput {
            product_id,
            vendor_id: 5,
            price,
            quantity,
        }
    }

    #[test]
    fn single_line_example() {
        let split = split_order(&[line(1, Decimal::from(100), 2)]).unwrap();
        let l = split.lines[0];
        assert_eq!(l.item_total, Decimal::from(200));
        assert_eq!(l.admin_commission, Decimal::from(10));
        assert_eq!(l.vendor_amount, Decimal::from(190));
        assert_eq!(split.total_amount, Decimal::from(200));
        assert_eq!(split.admin_commission, Decimal::from(10));
    }

    #[test]
    fn totals_hold_across_awkward_prices() {
        let cart = [
            line(1, Decimal::new(1999, 2), 3),
            line(2, Decimal::new(1, 2), 7),
            line(3, Decimal::new(33333, 2), 1),
            line(4, Decimal::new(5, 1), 13),
        ];
        let split = split_order(&cart).unwrap();

        let expected_total: Decimal = cart
            .iter()
            .map(|c| c.price * Decimal::from(c.quantity))
            .sum();
        assert_eq!(split.total_amount, expected_total);
        assert_eq!(split.admin_commission, expected_total * commission_rate());
        assert_eq!(
            split.vendor_total() + split.admin_commission,
            split.total_amount
        );

        for l in &split.lines {
            assert_eq!(
                l.vendor_amount + l.admin_commission,
                l.price * Decimal::from(l.quantity)
            );
        }
    }

    #[test]
    fn fractional_cent_prices_are_rounded_before_splitting() {
        let l = split_line(line(9, Decimal::new(19989999, 6), 1)).unwrap();
        assert_eq!(l.price, Decimal::new(1999, 2));
        assert_eq!(l.admin_commission, Decimal::new(9995, 4));
    }

    #[test]
    fn free_items_carry_no_commission() {
        let l = split_line(line(1, Decimal::ZERO, 4)).unwrap();
        assert!(l.admin_commission.is_zero());
        assert!(l.vendor_amount.is_zero());
    }

    #[test]
    fn rejects_bad_carts() {
        assert_eq!(split_order(&[]), Err(PricingError::EmptyCart));
        assert_eq!(
            split_order(&[line(3, Decimal::ONE, 0)]),
            Err(PricingError::InvalidQuantity(3))
        );
        assert_eq!(
            split_order(&[line(4, Decimal::new(-1, 0), 1)]),
            Err(PricingError::NegativePrice(4))
        );
    }

    #[test]
    fn column_limit_is_fourteen_digits_at_scale_four() {
        assert_eq!(MAX_AMOUNT, "9999999999.9999".parse::<Decimal>().unwrap());
        assert_eq!(within_range(MAX_AMOUNT), Some(MAX_AMOUNT));
        assert_eq!(within_range(MAX_AMOUNT + Decimal::new(1, 4)), None);
    }

    #[test]
    fn huge_amounts_are_rejected_instead_of_overflowing() {
        let huge = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        assert_eq!(
            split_line(line(1, huge, i32::MAX)),
            Err(PricingError::AmountTooLarge)
        );
        assert_eq!(
            split_line(line(1, Decimal::from(1_000_000), 20_000)),
            Err(PricingError::AmountTooLarge)
        );

        let near_limit = line(1, Decimal::from(6_000_000_000i64), 1);
        assert_eq!(
            split_order(&[near_limit, near_limit]),
            Err(PricingError::AmountTooLarge)
        );
    }
}
