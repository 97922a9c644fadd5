use std::path::PathBuf;

use chrono::NaiveDate;
use fuv_core::domain::variant::VariantState;
use fuv_core::{HashStatus, PricingContext, Quote, Variant, VariantSlot};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{input_failure, notice_messages, open_quote, write_quote, CommandResult};

#[derive(Debug, Clone)]
pub struct PriceArgs {
    pub quote_path: PathBuf,
    pub today: Option<NaiveDate>,
    pub write: bool,
}

#[derive(Debug, Serialize)]
struct VariantSummary<'a> {
    slot: VariantSlot,
    state: VariantState,
    selected: bool,
    annual_income: Option<Decimal>,
    deferral_period: Option<&'a str>,
    monthly_benefit: Decimal,
    monthly_pension: Decimal,
    gross_annual_premium: Decimal,
    discount_amount: Decimal,
    net_annual_premium: Decimal,
    net_monthly_premium: Decimal,
    income_error: Option<String>,
}

impl<'a> VariantSummary<'a> {
    fn new(variant: &'a Variant, selected: Option<VariantSlot>) -> Self {
        Self {
            slot: variant.slot,
            state: variant.state(),
            selected: selected == Some(variant.slot),
            annual_income: variant.annual_income,
            deferral_period: variant.deferral_period.as_deref(),
            monthly_benefit: variant.monthly_benefit,
            monthly_pension: variant.monthly_pension,
            gross_annual_premium: variant.gross_annual_premium,
            discount_amount: variant.discount_amount,
            net_annual_premium: variant.net_annual_premium,
            net_monthly_premium: variant.net_monthly_premium,
            income_error: variant.income_error.as_ref().map(|error| error.message()),
        }
    }
}

#[derive(Debug, Serialize)]
struct PriceDetails<'a> {
    quote_id: &'a str,
    hash_status: HashStatus,
    gross_premium_rate: Decimal,
    variants: Vec<VariantSummary<'a>>,
    notices: Vec<String>,
    written: bool,
}

pub fn run(args: &PriceArgs) -> CommandResult {
    let opened = match open_quote("price", &args.quote_path, args.today) {
        Ok(opened) => opened,
        Err(result) => return result,
    };
    let quote = &opened.quote;

    if args.write {
        if let Err(error) = write_quote(&args.quote_path, quote) {
            return input_failure("price", error);
        }
    }

    let context = PricingContext::for_quote(quote);
    let message = if context.gross_premium_rate > Decimal::ZERO {
        format!("priced variants for quote {}", quote.id.0)
    } else {
        format!("quote {} has no current technical assignment; premiums stay at zero", quote.id.0)
    };

    CommandResult::success_with_details(
        "price",
        message,
        PriceDetails {
            quote_id: &quote.id.0,
            hash_status: opened.hash_status,
            gross_premium_rate: context.gross_premium_rate,
            variants: summaries(quote),
            notices: notice_messages(opened.notices.visible()),
            written: args.write,
        },
    )
}

fn summaries(quote: &Quote) -> Vec<VariantSummary<'_>> {
    let selected = quote.variants.selected();
    quote.variants.iter().map(|variant| VariantSummary::new(variant, selected)).collect()
}
