use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::income::IncomeThresholdError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantSlot {
    A,
    B,
    C,
}

impl VariantSlot {
    pub const ALL: [VariantSlot; 3] = [VariantSlot::A, VariantSlot::B, VariantSlot::C];

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantState {
    Empty,
    HasIncome,
    HasIncomeAndDeferral,
    FullyPriced,
}

/// One priced offer. Every field below `deferral_period` is derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub slot: VariantSlot,
    #[serde(default)]
    pub annual_income: Option<Decimal>,
    #[serde(default)]
    pub deferral_period: Option<String>,
    #[serde(default)]
    pub monthly_income: Decimal,
    #[serde(default)]
    pub annual_benefit: Decimal,
    #[serde(default)]
    pub monthly_benefit: Decimal,
    #[serde(default)]
    pub annual_pension: Decimal,
    #[serde(default)]
    pub monthly_pension: Decimal,
    #[serde(default)]
    pub gross_annual_premium: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub net_annual_premium: Decimal,
    #[serde(default)]
    pub net_monthly_premium: Decimal,
    #[serde(default)]
    pub income_error: Option<IncomeThresholdError>,
}

impl Variant {
    pub fn empty(slot: VariantSlot) -> Self {
        Self {
            slot,
            annual_income: None,
            deferral_period: None,
            monthly_income: Decimal::ZERO,
            annual_benefit: Decimal::ZERO,
            monthly_benefit: Decimal::ZERO,
            annual_pension: Decimal::ZERO,
            monthly_pension: Decimal::ZERO,
            gross_annual_premium: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            net_annual_premium: Decimal::ZERO,
            net_monthly_premium: Decimal::ZERO,
            income_error: None,
        }
    }

    pub fn income(&self) -> Decimal {
        self.annual_income.unwrap_or(Decimal::ZERO)
    }

    pub fn has_income(&self) -> bool {
        self.income() > Decimal::ZERO
    }

    pub fn state(&self) -> VariantState {
        match (self.has_income(), self.deferral_period.is_some()) {
            (false, _) => VariantState::Empty,
            (true, false) => VariantState::HasIncome,
            (true, true) if self.gross_annual_premium > Decimal::ZERO => VariantState::FullyPriced,
            (true, true) => VariantState::HasIncomeAndDeferral,
        }
    }

    /// A slot only blocks the step when it carries both income and an error.
    pub fn blocks_step(&self) -> bool {
        self.annual_income.is_some_and(|income| !income.is_zero()) && self.income_error.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    pub fn installments_per_year(self) -> u32 {
        match self {
            Self::Annual => 1,
            Self::SemiAnnual => 2,
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Invoice,
    DirectDebit { iban: String, account_holder: String },
}

impl PaymentDetails {
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Invoice => true,
            Self::DirectDebit { iban, account_holder } => {
                !iban.trim().is_empty() && !account_holder.trim().is_empty()
            }
        }
    }
}
