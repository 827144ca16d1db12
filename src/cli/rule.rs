//! Match rule CLI commands

use clap::{Args, Subcommand};

use super::{parse_date, parse_money, Workspace};
use crate::audit::{AuditEntry, EntityType};
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::rule::{AmountBasis, AmountPredicate, DatePredicate, TextPredicate};
use crate::models::{MatchRule, TransactionType};

/// Rule subcommands
#[derive(Subcommand)]
pub enum RuleCommands {
    /// List rules, optionally for one label
    List {
        /// Label name or ID
        label: Option<String>,
    },

    /// Add a match rule to a label
    Add {
        /// Label name or ID
        label: String,
        #[command(flatten)]
        predicates: RuleArgs,
    },

    /// Remove a match rule
    Remove {
        /// Rule ID
        rule: String,
    },
}

/// Predicates for a new rule; omitted ones impose no constraint
#[derive(Args, Debug, Default)]
pub struct RuleArgs {
    /// Rule name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Payee text to match
    #[arg(short, long)]
    pub payee: Option<String>,

    /// Memo text to match
    #[arg(short, long)]
    pub memo: Option<String>,

    /// Match payee and memo exactly instead of by substring
    #[arg(long)]
    pub exact: bool,

    /// Match a single date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub on: Option<String>,

    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Exact amount
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["min", "max"])]
    pub amount: Option<String>,

    /// Minimum amount
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<String>,

    /// Maximum amount
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<String>,

    /// Compare the signed or absolute amount (required with an amount)
    #[arg(long)]
    pub basis: Option<String>,

    /// Transaction type codes to accept (repeatable)
    #[arg(long = "type")]
    pub types: Vec<String>,
}

impl RuleArgs {
    /// Build a rule from the given predicates
    pub fn into_rule(self) -> LabelbookResult<MatchRule> {
        let mut rule = MatchRule::new(self.name.unwrap_or_default());
        let exact = self.exact;
        let text = |pattern: String| {
            if exact {
                TextPredicate::exact(pattern)
            } else {
                TextPredicate::contains(pattern)
            }
        };

        if let Some(payee) = self.payee {
            rule = rule.with_payee(text(payee));
        }
        if let Some(memo) = self.memo {
            rule = rule.with_memo(text(memo));
        }

        if let Some(on) = &self.on {
            rule = rule.with_date(DatePredicate::On(parse_date(on)?));
        } else if self.from.is_some() || self.to.is_some() {
            rule = rule.with_date(DatePredicate::Between {
                from: self.from.as_deref().map(parse_date).transpose()?,
                to: self.to.as_deref().map(parse_date).transpose()?,
            });
        }

        let has_amount = self.amount.is_some() || self.min.is_some() || self.max.is_some();
        if has_amount {
            let basis: AmountBasis = self
                .basis
                .as_deref()
                .ok_or_else(|| {
                    LabelbookError::InvalidRule(
                        "an amount predicate needs --basis signed or --basis absolute".into(),
                    )
                })?
                .parse()
                .map_err(LabelbookError::InvalidRule)?;

            let predicate = match &self.amount {
                Some(amount) => AmountPredicate::exact(parse_money(amount)?, basis),
                None => AmountPredicate::range(
                    self.min.as_deref().map(parse_money).transpose()?,
                    self.max.as_deref().map(parse_money).transpose()?,
                    basis,
                ),
            };
            rule = rule.with_amount(predicate);
        }

        if !self.types.is_empty() {
            let types = self
                .types
                .iter()
                .map(|t| t.parse::<TransactionType>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(LabelbookError::InvalidRule)?;
            rule = rule.with_types(types);
        }

        Ok(rule)
    }
}

/// Handle a rule command
pub fn handle_rule_command(ws: &mut Workspace, cmd: RuleCommands) -> LabelbookResult<()> {
    match cmd {
        RuleCommands::List { label } => {
            let labels = match label {
                Some(label) => vec![ws.engine.find_label(&label)?],
                None => ws.engine.labels(),
            };

            let mut any = false;
            for label in labels {
                for rule in &label.rules {
                    any = true;
                    println!(
                        "{}  {:<20} {:<16} {}",
                        rule.id,
                        label.name,
                        rule.name,
                        rule.describe()
                    );
                }
            }
            if !any {
                println!("No rules found.");
            }
        }

        RuleCommands::Add { label, predicates } => {
            let label_id = ws.engine.find_label(&label)?.id;
            let rule = predicates.into_rule()?;
            let before = ws.engine.transactions_with_label(label_id)?.len();

            let rule_id = ws.engine.add_rule(label_id, rule)?;
            let label = ws.engine.registry().require(label_id)?.clone();
            let after = ws.engine.transactions_with_label(label_id)?.len();
            if let Some(rule) = label.rule(rule_id) {
                ws.record(AuditEntry::create(
                    EntityType::Rule,
                    rule_id.to_string(),
                    Some(label.name.clone()),
                    rule,
                )
                .for_label(label_id));
                println!("Added rule {} to '{}': {}", rule_id, label.name, rule.describe());
            }
            println!(
                "  '{}' now covers {} transactions ({:+})",
                label.name,
                after,
                after as i64 - before as i64
            );
        }

        RuleCommands::Remove { rule } => {
            let rule_id = ws
                .engine
                .registry()
                .find_rule(&rule)
                .map(|(_, r)| r.id)
                .ok_or_else(|| LabelbookError::rule_not_found(&rule))?;

            let (label_id, removed) = ws.engine.remove_rule_by_id(rule_id)?;
            let label_name = ws.engine.label(label_id).map(|l| l.name.clone());
            ws.record(AuditEntry::delete(
                EntityType::Rule,
                rule_id.to_string(),
                label_name.clone(),
                &removed,
            )
            .for_label(label_id));

            println!(
                "Removed rule {} from '{}'",
                rule_id,
                label_name.unwrap_or_default()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::{AmountBound, TextMatch};
    use crate::models::Money;

    #[test]
    fn test_payee_rule() {
        let rule = RuleArgs {
            payee: Some("KROGER".into()),
            ..Default::default()
        }
        .into_rule()
        .unwrap();
        assert_eq!(rule.payee.unwrap().mode, TextMatch::Contains);
    }

    #[test]
    fn test_amount_requires_basis() {
        let err = RuleArgs {
            min: Some("10".into()),
            ..Default::default()
        }
        .into_rule()
        .unwrap_err();
        assert!(matches!(err, LabelbookError::InvalidRule(_)));
    }

    #[test]
    fn test_amount_range_with_basis() {
        let rule = RuleArgs {
            min: Some("10".into()),
            max: Some("100".into()),
            basis: Some("absolute".into()),
            ..Default::default()
        }
        .into_rule()
        .unwrap();
        let amount = rule.amount.unwrap();
        assert_eq!(amount.basis, Some(AmountBasis::Absolute));
        assert_eq!(
            amount.bound,
            AmountBound::Range {
                min: Some(Money::from_cents(1000)),
                max: Some(Money::from_cents(10000)),
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = RuleArgs {
            types: vec!["teleport".into()],
            ..Default::default()
        }
        .into_rule();
        assert!(result.is_err());
    }
}
