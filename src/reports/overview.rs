//! Monthly Overview Report
//!
//! Income and bill activity for one month, grouped by label.

use crate::engine::aggregate;
use crate::engine::Engine;
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{AccountId, LabelId, LabelType, Money, Transaction, YearMonth};

/// One label's activity in the month
#[derive(Debug, Clone)]
pub struct OverviewRow {
    pub label_id: LabelId,
    pub label_name: String,
    pub total: Money,
    pub transactions: Vec<Transaction>,
}

/// Monthly Overview Report
#[derive(Debug, Clone)]
pub struct MonthlyOverview {
    pub period: YearMonth,
    pub account: Option<AccountId>,
    pub income: Vec<OverviewRow>,
    pub bills: Vec<OverviewRow>,
    pub total_income: Money,
    pub total_bills: Money,
}

impl MonthlyOverview {
    /// Generate the overview for a month, optionally restricted to one account
    pub fn generate(
        engine: &Engine,
        year: i32,
        month: u32,
        account: Option<&AccountId>,
    ) -> LabelbookResult<Self> {
        let period =
            YearMonth::new(year, month).map_err(|e| LabelbookError::Validation(e.to_string()))?;

        let in_scope: Vec<&Transaction> = engine
            .transactions()
            .into_iter()
            .filter(|t| YearMonth::from_date(t.date) == period)
            .filter(|t| account.map_or(true, |a| &t.account_id == a))
            .collect();

        let income = Self::rows(engine, LabelType::Income, &in_scope);
        let bills = Self::rows(engine, LabelType::Bill, &in_scope);

        Ok(Self {
            period,
            account: account.cloned(),
            total_income: income.iter().map(|r| r.total).sum(),
            total_bills: bills.iter().map(|r| r.total).sum(),
            income,
            bills,
        })
    }

    fn rows(engine: &Engine, label_type: LabelType, in_scope: &[&Transaction]) -> Vec<OverviewRow> {
        engine
            .labels_of_type(label_type)
            .into_iter()
            .filter_map(|label| {
                let transactions: Vec<Transaction> = in_scope
                    .iter()
                    .filter(|t| engine.assignments().is_assigned(&t.id, label.id))
                    .map(|t| (*t).clone())
                    .collect();
                if transactions.is_empty() {
                    return None;
                }
                let total = transactions
                    .iter()
                    .filter_map(|t| aggregate::contribution(label, t, engine.ledger()))
                    .sum();
                Some(OverviewRow {
                    label_id: label.id,
                    label_name: label.name.clone(),
                    total,
                    transactions,
                })
            })
            .collect()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Overview: {}", self.period.long_name()));
        if let Some(account) = &self.account {
            output.push_str(&format!(" (account {})", account));
        }
        output.push('\n');
        output.push_str(&"=".repeat(60));
        output.push('\n');

        for (title, rows, total) in [
            ("Income", &self.income, self.total_income),
            ("Bills", &self.bills, self.total_bills),
        ] {
            output.push_str(&format!("\n{}\n", title.to_uppercase()));
            if rows.is_empty() {
                output.push_str("  (none)\n");
                continue;
            }
            for row in rows {
                output.push_str(&format!(
                    "  {:<30} {:>12} {:>4} txn\n",
                    row.label_name,
                    row.total,
                    row.transactions.len()
                ));
            }
            output.push_str(&format!("  {:<30} {:>12}\n", "Total:", total));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::TextPredicate;
    use crate::models::{Label, MatchRule};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.import_transactions(vec![
            Transaction::new("P1", "1234", date(2024, 3, 1), Money::from_cents(250000))
                .with_payee("ACME PAYROLL"),
            Transaction::new("P2", "5678", date(2024, 3, 15), Money::from_cents(250000))
                .with_payee("ACME PAYROLL"),
            Transaction::new("R1", "1234", date(2024, 3, 1), Money::from_cents(-120000))
                .with_payee("OAK APARTMENTS"),
            Transaction::new("R0", "1234", date(2024, 2, 1), Money::from_cents(-120000))
                .with_payee("OAK APARTMENTS"),
        ]);
        engine
            .create_label(
                Label::new("Salary", LabelType::Income)
                    .with_rule(MatchRule::new("acme").with_payee(TextPredicate::contains("acme"))),
            )
            .unwrap();
        engine
            .create_label(
                Label::new("Rent", LabelType::Bill)
                    .with_rule(MatchRule::new("oak").with_payee(TextPredicate::contains("oak"))),
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_overview_totals() {
        let engine = engine();
        let overview = MonthlyOverview::generate(&engine, 2024, 3, None).unwrap();

        assert_eq!(overview.income.len(), 1);
        assert_eq!(overview.total_income.cents(), 500000);
        assert_eq!(overview.income[0].transactions.len(), 2);
        assert_eq!(overview.total_bills.cents(), 120000);
    }

    #[test]
    fn test_overview_for_account() {
        let engine = engine();
        let overview =
            MonthlyOverview::generate(&engine, 2024, 3, Some(&AccountId::new("1234"))).unwrap();
        assert_eq!(overview.total_income.cents(), 250000);
        assert!(overview.format_terminal().contains("March 2024"));
    }

    #[test]
    fn test_invalid_month() {
        let engine = engine();
        assert!(MonthlyOverview::generate(&engine, 2024, 0, None)
            .unwrap_err()
            .is_validation());
    }
}
