//! Cart budget and store availability.

use crate::flags;
use crate::ruleset::RuleSet;

use super::subject::lower;
use super::{Rule, RuleGroup, Subject};

pub struct BudgetRule;

impl Rule for BudgetRule {
    fn name(&self) -> &'static str {
        "budget_inventory"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::BudgetInventory
    }

    fn check(&self, subject: &Subject<'_>, _ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();
        let items = subject.cart_items();
        if items.is_empty() {
            return raised;
        }

        if let Some(budget) = subject.budget_usd() {
            let total: f64 = items.iter().map(|i| i.price_usd.unwrap_or(0.0)).sum();
            if total > budget {
                raised.push(flags::BUDGET_EXCEEDED);
            }
        }

        if subject.store().contains("trader")
            && items
                .iter()
                .any(|i| lower(i.sku.as_deref()).contains("costco"))
        {
            raised.push(flags::STORE_ITEM_UNAVAILABLE);
        }

        raised
    }
}
