//! Premium, benefit and pension arithmetic for a single variant.
//!
//! Every function is pure and treats non-positive input as "nothing to
//! compute", returning zero instead of failing. Billing cannot settle amounts
//! below five centimes, so premiums round to the nearest 0.05 and the monthly
//! daily benefit rounds up to the next 0.05.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::assignment::AgencyCompetence;

/// Smallest amount that can be billed or paid out.
pub const ROUNDING_STEP: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const BENEFIT_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const PENSION_RATIO: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Deferral period codes with their premium discount in percent.
pub const DEFERRAL_DISCOUNTS: [(&str, Decimal); 3] = [
    ("3", Decimal::ZERO),
    ("15", Decimal::from_parts(20, 0, 0, false, 0)),
    ("30", Decimal::from_parts(40, 0, 0, false, 0)),
];

fn positive(value: Decimal) -> Option<Decimal> {
    (value > Decimal::ZERO).then_some(value)
}

/// Rounds to the nearest multiple of [`ROUNDING_STEP`], midpoints away from zero.
pub fn round_to_step(value: Decimal) -> Decimal {
    (value / ROUNDING_STEP).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * ROUNDING_STEP
}

/// Rounds up to the next multiple of [`ROUNDING_STEP`].
pub fn ceil_to_step(value: Decimal) -> Decimal {
    (value / ROUNDING_STEP).ceil() * ROUNDING_STEP
}

pub fn monthly_income(annual_income: Decimal) -> Decimal {
    positive(annual_income).map_or(Decimal::ZERO, |income| income / MONTHS_PER_YEAR)
}

pub fn annual_benefit(annual_income: Decimal) -> Decimal {
    positive(annual_income).map_or(Decimal::ZERO, |income| income * BENEFIT_RATIO)
}

/// Monthly daily-benefit amount. The only figure that rounds up, so the
/// insured is never paid less than 80% of income.
pub fn monthly_benefit(annual_income: Decimal) -> Decimal {
    let annual = annual_benefit(annual_income);
    if annual.is_zero() {
        return Decimal::ZERO;
    }
    ceil_to_step(annual / MONTHS_PER_YEAR)
}

pub fn annual_pension(annual_income: Decimal) -> Decimal {
    positive(annual_income).map_or(Decimal::ZERO, |income| income * PENSION_RATIO)
}

/// Not rounded.
pub fn monthly_pension(annual_income: Decimal) -> Decimal {
    annual_pension(annual_income) / MONTHS_PER_YEAR
}

/// `base_level * (1 + competence / 100)`.
pub fn gross_premium_rate(base_level: Decimal, competence: AgencyCompetence) -> Decimal {
    positive(base_level).map_or(Decimal::ZERO, |level| level * competence.factor())
}

pub fn gross_annual_premium(annual_income: Decimal, gross_premium_rate: Decimal) -> Decimal {
    match (positive(annual_income), positive(gross_premium_rate)) {
        (Some(income), Some(rate)) => round_to_step(income / Decimal::ONE_HUNDRED * rate),
        _ => Decimal::ZERO,
    }
}

pub fn discount_amount(gross_annual_premium: Decimal, discount_percent: Decimal) -> Decimal {
    match (positive(gross_annual_premium), positive(discount_percent)) {
        (Some(gross), Some(percent)) => round_to_step(gross / Decimal::ONE_HUNDRED * percent),
        _ => Decimal::ZERO,
    }
}

pub fn net_annual_premium(gross_annual_premium: Decimal, discount_amount: Decimal) -> Decimal {
    positive(gross_annual_premium).map_or(Decimal::ZERO, |gross| gross - discount_amount)
}

pub fn net_monthly_premium(net_annual_premium: Decimal) -> Decimal {
    positive(net_annual_premium)
        .map_or(Decimal::ZERO, |net| round_to_step(net / MONTHS_PER_YEAR))
}

/// Unknown codes carry no discount.
pub fn deferral_discount_percent(deferral_code: &str) -> Decimal {
    let code = deferral_code.trim();
    DEFERRAL_DISCOUNTS
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(Decimal::ZERO, |(_, percent)| *percent)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PremiumBreakdown {
    pub gross_annual_premium: Decimal,
    pub discount_amount: Decimal,
    pub net_annual_premium: Decimal,
    pub net_monthly_premium: Decimal,
}

/// Runs the premium chain for one income and deferral period.
pub fn premium_breakdown(
    annual_income: Decimal,
    deferral_code: &str,
    gross_premium_rate: Decimal,
) -> PremiumBreakdown {
    let gross = gross_annual_premium(annual_income, gross_premium_rate);
    let discount = discount_amount(gross, deferral_discount_percent(deferral_code));
    let net = net_annual_premium(gross, discount);

    PremiumBreakdown {
        gross_annual_premium: gross,
        discount_amount: discount,
        net_annual_premium: net,
        net_monthly_premium: net_monthly_premium(net),
    }
}
