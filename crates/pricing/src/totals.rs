use serde::{Deserialize, Serialize};

use shopkit_cart::LineItem;
use shopkit_core::{DomainError, DomainResult, ValueObject};

use crate::config::PricingConfig;

/// Rates are expressed in basis points: 100 bps = 1%, 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Promo discount as basis points, always within `[0, 10_000]`.
///
/// Out-of-range input is clamped at construction, so a discount held in this
/// type can never exceed 100%; callers of [`compute_totals`] don't need to
/// re-check the range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct DiscountPercent(u32);

impl DiscountPercent {
    /// No discount.
    pub const ZERO: Self = Self(0);

    /// Upper bound in basis points (100%).
    pub const MAX_BPS: u32 = BPS_DENOMINATOR as u32;

    /// Build from basis points, clamping to `[0, 10_000]`.
    pub fn from_basis_points(bps: u32) -> Self {
        Self(bps.min(Self::MAX_BPS))
    }

    /// Build from a fractional percentage (e.g. `12.5` for 12.5%).
    ///
    /// Clamps to `[0, 100]` and rounds half-up to whole basis points. NaN is
    /// treated as no discount. This is the entry point for values coming off
    /// the wire from the promo validation call.
    pub fn from_percent(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::ZERO;
        }
        let clamped = percent.clamp(0.0, 100.0);
        Self((clamped * 100.0).round() as u32)
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// The fractional percentage this discount represents.
    pub fn as_percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for DiscountPercent {
    fn from(bps: u32) -> Self {
        Self::from_basis_points(bps)
    }
}

impl From<DiscountPercent> for u32 {
    fn from(value: DiscountPercent) -> Self {
        value.0
    }
}

impl ValueObject for DiscountPercent {}

/// Shipping tier chosen by the shopper at checkout.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
        }
    }
}

/// The order summary figures, all in integer cents.
///
/// Derived data: always recomputed from the line items and the applied
/// discount, never stored or mutated in place.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_cents: u64,
    pub discount_cents: u64,
    pub shipping_cents: u64,
    pub tax_cents: u64,
    pub total_cents: u64,
}

impl OrderTotals {
    /// The totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal_cents: 0,
        discount_cents: 0,
        shipping_cents: 0,
        tax_cents: 0,
        total_cents: 0,
    };
}

impl ValueObject for OrderTotals {}

/// Apply a basis-point rate to an amount, rounding half-up to whole cents.
fn apply_rate_bps(amount_cents: u64, rate_bps: u32) -> DomainResult<u64> {
    let scaled = (amount_cents as u128)
        .checked_mul(rate_bps as u128)
        .ok_or_else(|| DomainError::invariant("rate application overflow"))?;
    let rounded = (scaled + (BPS_DENOMINATOR as u128) / 2) / (BPS_DENOMINATOR as u128);
    u64::try_from(rounded).map_err(|_| DomainError::invariant("rate application overflow"))
}

/// Compute the order summary for a cart.
///
/// - subtotal = Σ unit price × quantity
/// - discount = subtotal × discount rate, never more than the subtotal
/// - shipping = 0 once the discounted subtotal reaches the free-shipping
///   threshold, otherwise the flat fee for the chosen method
/// - tax = (discounted subtotal + shipping) × tax rate
/// - total = discounted subtotal + shipping + tax
///
/// An empty cart yields all-zero totals (no shipping fee on nothing). Pure
/// and deterministic: safe to call on every render. All arithmetic is
/// checked; overflow surfaces as an invariant violation rather than a wrap.
pub fn compute_totals(
    items: &[LineItem],
    discount: DiscountPercent,
    shipping: ShippingMethod,
    config: &PricingConfig,
) -> DomainResult<OrderTotals> {
    if items.is_empty() {
        return Ok(OrderTotals::ZERO);
    }

    let mut subtotal_cents: u64 = 0;
    for item in items {
        let line_total = (item.unit_price_cents as u128)
            .checked_mul(item.quantity as u128)
            .ok_or_else(|| DomainError::invariant("cart line amount overflow"))?;
        let line_total = u64::try_from(line_total)
            .map_err(|_| DomainError::invariant("cart line amount overflow"))?;
        subtotal_cents = subtotal_cents
            .checked_add(line_total)
            .ok_or_else(|| DomainError::invariant("cart subtotal overflow"))?;
    }

    let discount_cents = apply_rate_bps(subtotal_cents, discount.basis_points())?.min(subtotal_cents);
    let discounted_cents = subtotal_cents - discount_cents;

    let shipping_cents = if discounted_cents >= config.free_shipping_threshold_cents {
        0
    } else {
        match shipping {
            ShippingMethod::Standard => config.standard_shipping_cents,
            ShippingMethod::Express => config.express_shipping_cents,
        }
    };

    let taxable_cents = discounted_cents
        .checked_add(shipping_cents)
        .ok_or_else(|| DomainError::invariant("taxable amount overflow"))?;
    let tax_cents = apply_rate_bps(taxable_cents, config.tax_rate_bps)?;

    let total_cents = taxable_cents
        .checked_add(tax_cents)
        .ok_or_else(|| DomainError::invariant("order total overflow"))?;

    Ok(OrderTotals {
        subtotal_cents,
        discount_cents,
        shipping_cents,
        tax_cents,
        total_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkit_cart::{LineItemId, ProductId};
    use shopkit_core::RecordId;

    fn test_item(unit_price_cents: u64, quantity: u32) -> LineItem {
        LineItem {
            id: LineItemId::new(RecordId::new()),
            product_id: ProductId::new(RecordId::new()),
            name: "Linen Shirt".to_string(),
            unit_price_cents,
            quantity,
            size: Some("M".to_string()),
            color: None,
        }
    }

    fn test_config() -> PricingConfig {
        PricingConfig {
            free_shipping_threshold_cents: 10_000,
            standard_shipping_cents: 599,
            express_shipping_cents: 1_499,
            tax_rate_bps: 800,
        }
    }

    #[test]
    fn empty_cart_yields_all_zero_totals() {
        for discount in [DiscountPercent::ZERO, DiscountPercent::from_percent(60.0)] {
            for method in [ShippingMethod::Standard, ShippingMethod::Express] {
                let totals = compute_totals(&[], discount, method, &test_config()).unwrap();
                assert_eq!(totals, OrderTotals::ZERO);
            }
        }
    }

    #[test]
    fn subtotal_sums_unit_price_times_quantity() {
        let items = vec![test_item(2_500, 2), test_item(1_000, 3)];
        let totals =
            compute_totals(&items, DiscountPercent::ZERO, ShippingMethod::Standard, &test_config())
                .unwrap();
        assert_eq!(totals.subtotal_cents, 8_000);
    }

    #[test]
    fn twenty_percent_off_a_ten_dollar_subtotal_is_two_dollars() {
        let items = vec![test_item(1_000, 1)];
        let totals = compute_totals(
            &items,
            DiscountPercent::from_percent(20.0),
            ShippingMethod::Standard,
            &test_config(),
        )
        .unwrap();
        assert_eq!(totals.discount_cents, 200);
    }

    #[test]
    fn full_discount_equals_subtotal_exactly() {
        let items = vec![test_item(3_333, 3)];
        let totals = compute_totals(
            &items,
            DiscountPercent::from_percent(100.0),
            ShippingMethod::Standard,
            &test_config(),
        )
        .unwrap();
        assert_eq!(totals.discount_cents, totals.subtotal_cents);
    }

    #[test]
    fn free_shipping_applies_exactly_at_the_threshold() {
        let config = test_config();

        let at = vec![test_item(10_000, 1)];
        let totals =
            compute_totals(&at, DiscountPercent::ZERO, ShippingMethod::Standard, &config).unwrap();
        assert_eq!(totals.shipping_cents, 0);

        let below = vec![test_item(9_999, 1)];
        let totals =
            compute_totals(&below, DiscountPercent::ZERO, ShippingMethod::Standard, &config).unwrap();
        assert_eq!(totals.shipping_cents, 599);
    }

    #[test]
    fn discount_can_pull_an_order_back_under_the_free_shipping_threshold() {
        // 12_000 gross, 20% off -> 9_600 discounted, below the 10_000 threshold.
        let items = vec![test_item(12_000, 1)];
        let totals = compute_totals(
            &items,
            DiscountPercent::from_percent(20.0),
            ShippingMethod::Standard,
            &test_config(),
        )
        .unwrap();
        assert_eq!(totals.shipping_cents, 599);
    }

    #[test]
    fn express_costs_the_express_fee_below_threshold_and_nothing_above() {
        let config = test_config();

        let below = vec![test_item(5_000, 1)];
        let totals =
            compute_totals(&below, DiscountPercent::ZERO, ShippingMethod::Express, &config).unwrap();
        assert_eq!(totals.shipping_cents, 1_499);

        let above = vec![test_item(12_000, 1)];
        let totals =
            compute_totals(&above, DiscountPercent::ZERO, ShippingMethod::Express, &config).unwrap();
        assert_eq!(totals.shipping_cents, 0);
    }

    #[test]
    fn tax_is_charged_on_discounted_subtotal_plus_shipping() {
        // 5_000 - 1_000 + 599 = 4_599 taxable; 8% of that rounds to 368.
        let items = vec![test_item(5_000, 1)];
        let totals = compute_totals(
            &items,
            DiscountPercent::from_percent(20.0),
            ShippingMethod::Standard,
            &test_config(),
        )
        .unwrap();
        assert_eq!(totals.tax_cents, 368);
        assert_eq!(totals.total_cents, 4_000 + 599 + 368);
    }

    #[test]
    fn rate_application_rounds_half_up() {
        // 10% of 5 cents is 0.5 cents; half-up lands on 1.
        assert_eq!(apply_rate_bps(5, 1_000).unwrap(), 1);
        // 10% of 4 cents is 0.4 cents; rounds down to 0.
        assert_eq!(apply_rate_bps(4, 1_000).unwrap(), 0);
    }

    #[test]
    fn discount_percent_clamps_out_of_range_input() {
        assert_eq!(DiscountPercent::from_percent(-5.0), DiscountPercent::ZERO);
        assert_eq!(
            DiscountPercent::from_percent(250.0).basis_points(),
            DiscountPercent::MAX_BPS
        );
        assert_eq!(DiscountPercent::from_percent(f64::NAN), DiscountPercent::ZERO);
        assert_eq!(DiscountPercent::from_percent(12.5).basis_points(), 1_250);
        assert_eq!(DiscountPercent::from_basis_points(60_000).basis_points(), 10_000);
    }

    #[test]
    fn compute_totals_is_pure() {
        let items = vec![test_item(4_199, 2), test_item(899, 1)];
        let discount = DiscountPercent::from_percent(15.0);

        let first =
            compute_totals(&items, discount, ShippingMethod::Express, &test_config()).unwrap();
        let second =
            compute_totals(&items, discount, ShippingMethod::Express, &test_config()).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                // Use deterministic seed for CI reproducibility
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: the discount never exceeds the subtotal, for any
            /// discount rate the type can represent.
            #[test]
            fn discount_never_exceeds_subtotal(
                prices in proptest::collection::vec(0u64..1_000_000, 0..12),
                bps in 0u32..=10_000,
            ) {
                let items: Vec<LineItem> = prices
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| test_item(p, (i % 10 + 1) as u32))
                    .collect();
                let totals = compute_totals(
                    &items,
                    DiscountPercent::from_basis_points(bps),
                    ShippingMethod::Standard,
                    &test_config(),
                )
                .unwrap();
                prop_assert!(totals.discount_cents <= totals.subtotal_cents);
            }

            /// Property: the total is exactly the sum of its published parts.
            #[test]
            fn total_is_the_sum_of_its_parts(
                prices in proptest::collection::vec(0u64..1_000_000, 1..12),
                bps in 0u32..=10_000,
                express in proptest::bool::ANY,
            ) {
                let items: Vec<LineItem> = prices
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| test_item(p, (i % 10 + 1) as u32))
                    .collect();
                let method = if express { ShippingMethod::Express } else { ShippingMethod::Standard };
                let totals = compute_totals(
                    &items,
                    DiscountPercent::from_basis_points(bps),
                    method,
                    &test_config(),
                )
                .unwrap();
                prop_assert_eq!(
                    totals.total_cents,
                    totals.subtotal_cents - totals.discount_cents
                        + totals.shipping_cents
                        + totals.tax_cents
                );
            }

            /// Property: identical inputs always produce identical totals.
            #[test]
            fn compute_totals_is_deterministic(
                price in 0u64..1_000_000,
                quantity in 1u32..=10,
                bps in 0u32..=10_000,
            ) {
                let items = vec![test_item(price, quantity)];
                let discount = DiscountPercent::from_basis_points(bps);
                let a = compute_totals(&items, discount, ShippingMethod::Standard, &test_config());
                let b = compute_totals(&items, discount, ShippingMethod::Standard, &test_config());
                prop_assert_eq!(a, b);
            }
        }
    }
}
