use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::assignment::{AgencyCompetence, TechnicalAssignment};
use crate::domain::quote::Quote;
use crate::domain::variant::{PaymentDetails, PaymentFrequency, Variant, VariantSlot};
use crate::pricing::formula::{self, PremiumBreakdown};
use crate::tracking::hash::usable_assignment;
use crate::validation::income::IncomeRules;
use crate::validation::FieldErrors;

/// Rate inputs shared by all three variants of a quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PricingContext {
    pub gross_premium_rate: Decimal,
}

impl PricingContext {
    /// Without an assignment no premium can be computed; benefits and
    /// pensions still are.
    pub fn new(assignment: Option<&TechnicalAssignment>, competence: AgencyCompetence) -> Self {
        let gross_premium_rate = assignment.map_or(Decimal::ZERO, |assignment| {
            formula::gross_premium_rate(Decimal::from(assignment.base_level), competence)
        });
        Self { gross_premium_rate }
    }

    pub fn for_quote(quote: &Quote) -> Self {
        Self::new(usable_assignment(quote), quote.agency_competence)
    }
}

/// The three fixed offer slots plus the current selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    variants: [Variant; 3],
    #[serde(default)]
    selected: Option<VariantSlot>,
}

impl Default for VariantSet {
    fn default() -> Self {
        Self {
            variants: VariantSlot::ALL.map(Variant::empty),
            selected: None,
        }
    }
}

impl VariantSet {
    pub fn get(&self, slot: VariantSlot) -> &Variant {
        &self.variants[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn selected(&self) -> Option<VariantSlot> {
        self.selected
    }

    pub fn selected_variant(&self) -> Option<&Variant> {
        self.selected.map(|slot| self.get(slot))
    }

    pub fn set_income(
        &mut self,
        slot: VariantSlot,
        annual_income: Option<Decimal>,
        context: &PricingContext,
        rules: &IncomeRules,
    ) {
        let variant = &mut self.variants[slot.index()];
        variant.annual_income = annual_income;
        reprice(variant, context);
        validate(variant, rules);
    }

    pub fn set_deferral_period(
        &mut self,
        slot: VariantSlot,
        deferral_period: Option<String>,
        context: &PricingContext,
    ) {
        let variant = &mut self.variants[slot.index()];
        variant.deferral_period = deferral_period;
        reprice(variant, context);
    }

    /// Propagates A's income and deferral period to B and C.
    pub fn copy_from_a(&mut self, context: &PricingContext, rules: &IncomeRules) {
        let source = self.get(VariantSlot::A);
        let (income, deferral) = (source.annual_income, source.deferral_period.clone());

        for slot in [VariantSlot::B, VariantSlot::C] {
            let variant = &mut self.variants[slot.index()];
            variant.annual_income = income;
            variant.deferral_period = deferral.clone();
            reprice(variant, context);
            validate(variant, rules);
        }
    }

    /// Selecting the selected slot again deselects it. The slot losing the
    /// selection has its income error cleared; computed values stay.
    pub fn toggle_selection(&mut self, slot: VariantSlot) -> Option<VariantSlot> {
        let previous = self.selected;
        if let Some(previous) = previous {
            self.variants[previous.index()].income_error = None;
        }

        self.selected = if previous == Some(slot) { None } else { Some(slot) };
        self.selected
    }

    /// Recomputes every slot, e.g. after the assignment or the agency
    /// competence changed.
    pub fn reprice_all(&mut self, context: &PricingContext) {
        for variant in &mut self.variants {
            reprice(variant, context);
        }
    }

    pub fn validate_incomes(&mut self, rules: &IncomeRules) {
        for variant in &mut self.variants {
            validate(variant, rules);
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.variants.iter().any(Variant::blocks_step)
    }

    pub fn pricing_step_errors(
        &self,
        payment_frequency: Option<PaymentFrequency>,
        payment_details: Option<&PaymentDetails>,
    ) -> FieldErrors {
        let mut errors = FieldErrors::default();

        for variant in self.variants.iter().filter(|variant| variant.blocks_step()) {
            if let Some(error) = &variant.income_error {
                errors.insert(format!("variant{}.annualIncome", variant.slot.label()), error.message());
            }
        }

        match self.selected_variant() {
            None => errors.insert("selectedVariant", "select one variant"),
            Some(variant) if variant.net_annual_premium <= Decimal::ZERO => {
                errors.insert("selectedVariant", "the selected variant is not priced")
            }
            Some(_) => {}
        }

        if payment_frequency.is_none() {
            errors.insert("paymentFrequency", "choose a payment frequency");
        }

        if !payment_details.is_some_and(PaymentDetails::is_complete) {
            errors.insert("paymentDetails", "payment details are incomplete");
        }

        errors
    }

    pub fn pricing_step_complete(
        &self,
        payment_frequency: Option<PaymentFrequency>,
        payment_details: Option<&PaymentDetails>,
    ) -> bool {
        self.pricing_step_errors(payment_frequency, payment_details).is_empty()
    }
}

/// Writes all derived fields of one slot in a single assignment.
fn reprice(variant: &mut Variant, context: &PricingContext) {
    let income = variant.income();
    let premium = match variant.deferral_period.as_deref() {
        Some(code) => formula::premium_breakdown(income, code, context.gross_premium_rate),
        None => PremiumBreakdown::default(),
    };

    *variant = Variant {
        monthly_income: formula::monthly_income(income),
        annual_benefit: formula::annual_benefit(income),
        monthly_benefit: formula::monthly_benefit(income),
        annual_pension: formula::annual_pension(income),
        monthly_pension: formula::monthly_pension(income),
        gross_annual_premium: premium.gross_annual_premium,
        discount_amount: premium.discount_amount,
        net_annual_premium: premium.net_annual_premium,
        net_monthly_premium: premium.net_monthly_premium,
        ..variant.clone()
    };
}

fn validate(variant: &mut Variant, rules: &IncomeRules) {
    variant.income_error = variant.annual_income.and_then(|income| rules.validate(income).err());
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{PricingContext, VariantSet};
    use crate::domain::assignment::{AgencyCompetence, TechnicalAssignment};
    use crate::domain::variant::{PaymentDetails, PaymentFrequency, VariantSlot, VariantState};
    use crate::validation::income::{IncomeRules, IncomeThresholdError};

    fn context() -> PricingContext {
        let assignment = TechnicalAssignment {
            base_premium_rate: Decimal::new(245, 2),
            base_level: 12,
            classes: Vec::new(),
        };
        PricingContext::new(Some(&assignment), AgencyCompetence(10))
    }

    fn family_rules() -> IncomeRules {
        IncomeRules { is_family_member: true, ..IncomeRules::default() }
    }

    #[test]
    fn slot_walks_through_states_as_inputs_arrive() {
        let mut set = VariantSet::default();
        assert_eq!(set.get(VariantSlot::A).state(), VariantState::Empty);

        set.set_income(VariantSlot::A, Some(Decimal::from(60_000)), &context(), &IncomeRules::default());
        let a = set.get(VariantSlot::A);
        assert_eq!(a.state(), VariantState::HasIncome);
        assert_eq!(a.monthly_income, Decimal::from(5_000));
        assert_eq!(a.monthly_benefit, Decimal::from(4_000));
        assert_eq!(a.gross_annual_premium, Decimal::ZERO);

        set.set_deferral_period(VariantSlot::A, Some("15".to_string()), &context());
        let a = set.get(VariantSlot::A);
        assert_eq!(a.state(), VariantState::FullyPriced);
        assert_eq!(a.gross_annual_premium, Decimal::from(7_920));
        assert_eq!(a.net_monthly_premium, Decimal::from(528));

        assert_eq!(set.get(VariantSlot::B).state(), VariantState::Empty);
    }

    #[test]
    fn without_assignment_slot_stops_before_premium() {
        let mut set = VariantSet::default();
        let unpriced = PricingContext::new(None, AgencyCompetence(0));

        set.set_income(VariantSlot::C, Some(Decimal::from(50_000)), &unpriced, &IncomeRules::default());
        set.set_deferral_period(VariantSlot::C, Some("30".to_string()), &unpriced);

        let c = set.get(VariantSlot::C);
        assert_eq!(c.state(), VariantState::HasIncomeAndDeferral);
        assert_eq!(c.annual_benefit, Decimal::from(40_000));
    }

    #[test]
    fn copy_from_a_prices_b_and_c() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::A, Some(Decimal::from(60_000)), &context(), &IncomeRules::default());
        set.set_deferral_period(VariantSlot::A, Some("30".to_string()), &context());

        set.copy_from_a(&context(), &IncomeRules::default());

        for slot in [VariantSlot::B, VariantSlot::C] {
            assert_eq!(set.get(slot).annual_income, Some(Decimal::from(60_000)));
            assert_eq!(set.get(slot).deferral_period.as_deref(), Some("30"));
            assert_eq!(set.get(slot).net_annual_premium, set.get(VariantSlot::A).net_annual_premium);
        }
    }

    #[test]
    fn selection_toggles_and_never_exceeds_one() {
        let mut set = VariantSet::default();

        assert_eq!(set.toggle_selection(VariantSlot::A), Some(VariantSlot::A));
        assert_eq!(set.toggle_selection(VariantSlot::B), Some(VariantSlot::B));
        assert_eq!(set.selected(), Some(VariantSlot::B));
        assert_eq!(set.toggle_selection(VariantSlot::B), None);
        assert_eq!(set.selected(), None);
    }

    #[test]
    fn deselecting_clears_income_error_but_keeps_values() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::A, Some(Decimal::from(30_000)), &context(), &family_rules());
        set.toggle_selection(VariantSlot::A);
        assert!(matches!(
            set.get(VariantSlot::A).income_error,
            Some(IncomeThresholdError::FamilyMemberMinimum { .. })
        ));

        set.toggle_selection(VariantSlot::B);

        let a = set.get(VariantSlot::A);
        assert_eq!(a.income_error, None);
        assert_eq!(a.monthly_income, Decimal::from(2_500));
    }

    #[test]
    fn toggling_selected_slot_off_clears_its_error_but_keeps_values() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::A, Some(Decimal::from(30_000)), &context(), &family_rules());
        set.toggle_selection(VariantSlot::A);
        let priced = set.get(VariantSlot::A).clone();
        assert!(priced.income_error.is_some());

        assert_eq!(set.toggle_selection(VariantSlot::A), None);

        let a = set.get(VariantSlot::A);
        assert_eq!(set.selected(), None);
        assert_eq!(a.income_error, None);
        assert_eq!(a.income(), Decimal::from(30_000));
        assert_eq!(a.monthly_income, priced.monthly_income);
        assert_eq!(a.gross_annual_premium, priced.gross_annual_premium);
    }

    #[test]
    fn error_on_income_slot_invalidates_regardless_of_selection() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::A, Some(Decimal::from(60_000)), &context(), &family_rules());
        set.set_income(VariantSlot::C, Some(Decimal::from(20_000)), &context(), &family_rules());
        set.toggle_selection(VariantSlot::A);

        assert!(!set.is_valid());

        set.set_income(VariantSlot::C, None, &context(), &family_rules());
        assert!(set.is_valid());
    }

    #[test]
    fn pricing_step_requires_selection_frequency_and_payment() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::B, Some(Decimal::from(60_000)), &context(), &IncomeRules::default());
        set.set_deferral_period(VariantSlot::B, Some("3".to_string()), &context());

        let errors = set.pricing_step_errors(None, None);
        assert!(errors.contains("selectedVariant"));
        assert!(errors.contains("paymentFrequency"));
        assert!(errors.contains("paymentDetails"));

        set.toggle_selection(VariantSlot::B);
        assert!(set.pricing_step_complete(Some(PaymentFrequency::Quarterly), Some(&PaymentDetails::Invoice)));
    }

    #[test]
    fn reprice_all_follows_competence_change() {
        let mut set = VariantSet::default();
        set.set_income(VariantSlot::A, Some(Decimal::from(60_000)), &context(), &IncomeRules::default());
        set.set_deferral_period(VariantSlot::A, Some("3".to_string()), &context());

        let assignment = TechnicalAssignment {
            base_premium_rate: Decimal::new(245, 2),
            base_level: 12,
            classes: Vec::new(),
        };
        set.reprice_all(&PricingContext::new(Some(&assignment), AgencyCompetence(0)));

        // 60'000 / 100 * 12
        assert_eq!(set.get(VariantSlot::A).gross_annual_premium, Decimal::from(7_200));
    }
}
