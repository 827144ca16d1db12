//! Match rules
//!
//! A rule is a conjunction of optional field predicates. Predicates that are
//! absent (or present but blank) impose no constraint, and a rule with no
//! effective predicate never matches anything.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::RuleId;
use super::money::Money;
use super::transaction::{Transaction, TransactionType};

/// Date constraint on a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePredicate {
    /// Transaction date equals this date
    On(NaiveDate),
    /// Transaction date falls within the inclusive bounds given
    Between {
        #[serde(default)]
        from: Option<NaiveDate>,
        #[serde(default)]
        to: Option<NaiveDate>,
    },
}

impl DatePredicate {
    fn is_effective(&self) -> bool {
        match self {
            Self::On(_) => true,
            Self::Between { from, to } => from.is_some() || to.is_some(),
        }
    }

    fn accepts(&self, date: NaiveDate) -> bool {
        match self {
            Self::On(on) => date == *on,
            Self::Between { from, to } => {
                from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
            }
        }
    }
}

/// How a text predicate compares against the transaction field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextMatch {
    Exact,
    #[default]
    Contains,
}

/// Case-insensitive constraint on memo or payee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPredicate {
    pub pattern: String,
    #[serde(default)]
    pub mode: TextMatch,
}

impl TextPredicate {
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: TextMatch::Exact,
        }
    }

    pub fn contains(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: TextMatch::Contains,
        }
    }

    fn is_effective(&self) -> bool {
        !self.pattern.is_empty()
    }

    fn accepts(&self, field: &str) -> bool {
        let pattern = self.pattern.to_lowercase();
        let field = field.to_lowercase();
        match self.mode {
            TextMatch::Exact => field == pattern,
            TextMatch::Contains => field.contains(&pattern),
        }
    }
}

/// Whether an amount predicate compares the signed or absolute amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountBasis {
    Signed,
    Absolute,
}

impl fmt::Display for AmountBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed => write!(f, "signed"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

impl std::str::FromStr for AmountBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signed" => Ok(Self::Signed),
            "absolute" | "abs" => Ok(Self::Absolute),
            other => Err(format!(
                "Unknown amount basis '{}' (expected signed or absolute)",
                other
            )),
        }
    }
}

/// Bound(s) an amount must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBound {
    Exact(Money),
    Range {
        #[serde(default)]
        min: Option<Money>,
        #[serde(default)]
        max: Option<Money>,
    },
}

/// Amount constraint; `basis` must be set explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPredicate {
    pub bound: AmountBound,
    #[serde(default)]
    pub basis: Option<AmountBasis>,
}

impl AmountPredicate {
    pub fn exact(amount: Money, basis: AmountBasis) -> Self {
        Self {
            bound: AmountBound::Exact(amount),
            basis: Some(basis),
        }
    }

    pub fn range(min: Option<Money>, max: Option<Money>, basis: AmountBasis) -> Self {
        Self {
            bound: AmountBound::Range { min, max },
            basis: Some(basis),
        }
    }

    fn is_effective(&self) -> bool {
        match &self.bound {
            AmountBound::Exact(_) => true,
            AmountBound::Range { min, max } => min.is_some() || max.is_some(),
        }
    }

    fn accepts(&self, amount: Money) -> bool {
        let value = match self.basis {
            Some(AmountBasis::Signed) => amount,
            Some(AmountBasis::Absolute) => amount.abs(),
            None => return false,
        };
        match &self.bound {
            AmountBound::Exact(exact) => value == *exact,
            AmountBound::Range { min, max } => {
                min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
            }
        }
    }
}

/// A conjunction of optional predicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub id: RuleId,

    /// Display name for the rule
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DatePredicate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<TextPredicate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<TextPredicate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountPredicate>,

    /// Accepted transaction types; empty means any
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<TransactionType>,
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::new("")
    }
}

impl MatchRule {
    /// Create a rule with no predicates
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into(),
            date: None,
            memo: None,
            payee: None,
            amount: None,
            types: BTreeSet::new(),
        }
    }

    pub fn with_date(mut self, date: DatePredicate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_memo(mut self, memo: TextPredicate) -> Self {
        self.memo = Some(memo);
        self
    }

    pub fn with_payee(mut self, payee: TextPredicate) -> Self {
        self.payee = Some(payee);
        self
    }

    pub fn with_amount(mut self, amount: AmountPredicate) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TransactionType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Number of predicates that actually constrain a match
    pub fn predicate_count(&self) -> usize {
        [
            self.date.as_ref().is_some_and(|d| d.is_effective()),
            self.memo.as_ref().is_some_and(|m| m.is_effective()),
            self.payee.as_ref().is_some_and(|p| p.is_effective()),
            self.amount.as_ref().is_some_and(|a| a.is_effective()),
            !self.types.is_empty(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Check if the rule declares no effective predicate
    pub fn is_empty(&self) -> bool {
        self.predicate_count() == 0
    }

    /// Evaluate the rule against a transaction
    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.is_empty() {
            return false;
        }

        if let Some(date) = self.date.as_ref().filter(|d| d.is_effective()) {
            if !date.accepts(txn.date) {
                return false;
            }
        }
        if let Some(memo) = self.memo.as_ref().filter(|m| m.is_effective()) {
            if !memo.accepts(&txn.memo) {
                return false;
            }
        }
        if let Some(payee) = self.payee.as_ref().filter(|p| p.is_effective()) {
            if !payee.accepts(&txn.payee) {
                return false;
            }
        }
        if let Some(amount) = self.amount.as_ref().filter(|a| a.is_effective()) {
            if !amount.accepts(txn.amount) {
                return false;
            }
        }
        if !self.types.is_empty() && !self.types.contains(&txn.tx_type) {
            return false;
        }

        true
    }

    /// Validate the rule
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.is_empty() {
            return Err(RuleValidationError::NoPredicates);
        }

        if let Some(DatePredicate::Between {
            from: Some(from),
            to: Some(to),
        }) = &self.date
        {
            if from > to {
                return Err(RuleValidationError::InvertedDateRange);
            }
        }

        if let Some(amount) = &self.amount {
            if amount.is_effective() && amount.basis.is_none() {
                return Err(RuleValidationError::MissingAmountBasis);
            }
            if let AmountBound::Range {
                min: Some(min),
                max: Some(max),
            } = &amount.bound
            {
                if min > max {
                    return Err(RuleValidationError::InvertedAmountRange);
                }
            }
        }

        Ok(())
    }

    /// One-line description of the declared predicates
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        match &self.date {
            Some(DatePredicate::On(d)) => parts.push(format!("date = {}", d)),
            Some(DatePredicate::Between { from, to }) if from.is_some() || to.is_some() => {
                let from = from.map(|d| d.to_string()).unwrap_or_else(|| "..".into());
                let to = to.map(|d| d.to_string()).unwrap_or_else(|| "..".into());
                parts.push(format!("date in [{}, {}]", from, to));
            }
            _ => {}
        }

        for (field, predicate) in [("memo", &self.memo), ("payee", &self.payee)] {
            if let Some(p) = predicate.as_ref().filter(|p| p.is_effective()) {
                let op = match p.mode {
                    TextMatch::Exact => "=",
                    TextMatch::Contains => "~",
                };
                parts.push(format!("{} {} \"{}\"", field, op, p.pattern));
            }
        }

        if let Some(a) = self.amount.as_ref().filter(|a| a.is_effective()) {
            let basis = a.basis.map(|b| b.to_string()).unwrap_or_else(|| "?".into());
            match &a.bound {
                AmountBound::Exact(m) => parts.push(format!("{} amount = {}", basis, m)),
                AmountBound::Range { min, max } => {
                    let min = min.map(|m| m.to_string()).unwrap_or_else(|| "..".into());
                    let max = max.map(|m| m.to_string()).unwrap_or_else(|| "..".into());
                    parts.push(format!("{} amount in [{}, {}]", basis, min, max));
                }
            }
        }

        if !self.types.is_empty() {
            let types: Vec<&str> = self.types.iter().map(|t| t.code()).collect();
            parts.push(format!("type in {{{}}}", types.join(", ")));
        }

        if parts.is_empty() {
            "(no predicates)".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

/// Evaluate `rule` against `txn`
pub fn matches(rule: &MatchRule, txn: &Transaction) -> bool {
    rule.matches(txn)
}

/// Validation errors for match rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    NoPredicates,
    MissingAmountBasis,
    InvertedDateRange,
    InvertedAmountRange,
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPredicates => write!(f, "Rule must declare at least one predicate"),
            Self::MissingAmountBasis => {
                write!(f, "Amount predicate must specify a signed or absolute basis")
            }
            Self::InvertedDateRange => write!(f, "Date range start is after its end"),
            Self::InvertedAmountRange => write!(f, "Amount range minimum exceeds its maximum"),
        }
    }
}

impl std::error::Error for RuleValidationError {}
