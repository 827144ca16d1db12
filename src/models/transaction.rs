//! Transaction model
//!
//! Transactions arrive already normalized from the statement importer and are
//! never mutated afterwards: labels, splits and budgets all refer to them by id.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{AccountId, TransactionId};
use super::money::Money;

/// Kind of transaction as reported by the bank export
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    Interest,
    Dividend,
    Fee,
    ServiceCharge,
    Deposit,
    Atm,
    Pos,
    Transfer,
    Check,
    Payment,
    Cash,
    DirectDeposit,
    DirectDebit,
    RepeatPayment,
    #[default]
    Other,
}

impl TransactionType {
    /// Get all transaction types in declaration order
    pub fn all() -> &'static [Self] {
        &[
            Self::Credit,
            Self::Debit,
            Self::Interest,
            Self::Dividend,
            Self::Fee,
            Self::ServiceCharge,
            Self::Deposit,
            Self::Atm,
            Self::Pos,
            Self::Transfer,
            Self::Check,
            Self::Payment,
            Self::Cash,
            Self::DirectDeposit,
            Self::DirectDebit,
            Self::RepeatPayment,
            Self::Other,
        ]
    }

    /// Parse a type code leniently; unknown codes become `Other`
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or(Self::Other)
    }

    /// The bank-export spelling of this type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Interest => "int",
            Self::Dividend => "div",
            Self::Fee => "fee",
            Self::ServiceCharge => "srvchg",
            Self::Deposit => "dep",
            Self::Atm => "atm",
            Self::Pos => "pos",
            Self::Transfer => "xfer",
            Self::Check => "check",
            Self::Payment => "payment",
            Self::Cash => "cash",
            Self::DirectDeposit => "directdep",
            Self::DirectDebit => "directdebit",
            Self::RepeatPayment => "repeatpmt",
            Self::Other => "other",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-', ' '], "");
        let found = match normalized.as_str() {
            "credit" => Self::Credit,
            "debit" => Self::Debit,
            "int" | "interest" => Self::Interest,
            "div" | "dividend" => Self::Dividend,
            "fee" => Self::Fee,
            "srvchg" | "servicecharge" => Self::ServiceCharge,
            "dep" | "deposit" => Self::Deposit,
            "atm" => Self::Atm,
            "pos" => Self::Pos,
            "xfer" | "transfer" => Self::Transfer,
            "check" | "cheque" => Self::Check,
            "payment" => Self::Payment,
            "cash" => Self::Cash,
            "directdep" | "directdeposit" => Self::DirectDeposit,
            "directdebit" => Self::DirectDebit,
            "repeatpmt" | "repeatpayment" => Self::RepeatPayment,
            "other" => Self::Other,
            _ => return Err(format!("Unknown transaction type: {}", s)),
        };
        Ok(found)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A financial transaction as produced by the statement importer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier assigned by the importer
    pub id: TransactionId,

    /// The account this transaction belongs to
    pub account_id: AccountId,

    /// Transaction date
    pub date: NaiveDate,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// Transaction type
    #[serde(default, rename = "type")]
    pub tx_type: TransactionType,

    /// Memo from the bank export
    #[serde(default)]
    pub memo: String,

    /// Payee from the bank export
    #[serde(default)]
    pub payee: String,
}

impl Transaction {
    /// Create a new transaction with empty memo and payee
    pub fn new(
        id: impl Into<TransactionId>,
        account_id: impl Into<AccountId>,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            date,
            amount,
            tx_type: TransactionType::Other,
            memo: String::new(),
            payee: String::new(),
        }
    }

    /// Set the payee
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = payee.into();
        self
    }

    /// Set the memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Set the transaction type
    pub fn with_type(mut self, tx_type: TransactionType) -> Self {
        self.tx_type = tx_type;
        self
    }

    /// Check if this is an inflow (positive amount)
    pub fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    /// Check if this is an outflow (negative amount)
    pub fn is_outflow(&self) -> bool {
        self.amount.is_negative()
    }

    /// The splittable total of this transaction
    pub fn magnitude(&self) -> Money {
        self.amount.abs()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.payee,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new("T1", "1234", date(2024, 3, 5), Money::from_cents(-5432))
            .with_payee("KROGER #123")
            .with_type(TransactionType::Pos);

        assert_eq!(txn.id.as_str(), "T1");
        assert_eq!(txn.account_id.as_str(), "1234");
        assert_eq!(txn.payee, "KROGER #123");
        assert_eq!(txn.tx_type, TransactionType::Pos);
        assert!(txn.is_outflow());
        assert_eq!(txn.magnitude(), Money::from_cents(5432));
    }

    #[test]
    fn test_type_codes() {
        assert_eq!("POS".parse::<TransactionType>().unwrap(), TransactionType::Pos);
        assert_eq!(
            "DIRECTDEP".parse::<TransactionType>().unwrap(),
            TransactionType::DirectDeposit
        );
        assert_eq!(TransactionType::from_code("weird"), TransactionType::Other);
        assert!("weird".parse::<TransactionType>().is_err());

        for t in TransactionType::all() {
            assert_eq!(&t.code().parse::<TransactionType>().unwrap(), t);
        }
    }

    #[test]
    fn test_serialization_uses_type_key() {
        let txn = Transaction::new("T1", "1234", date(2024, 3, 5), Money::from_cents(-100))
            .with_type(TransactionType::Debit);
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "debit");
        assert_eq!(json["amount"], -100);

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, txn);
    }

    #[test]
    fn test_display() {
        let txn = Transaction::new("T1", "1234", date(2025, 1, 15), Money::from_cents(-5000))
            .with_payee("Test Store");
        assert_eq!(format!("{}", txn), "2025-01-15 Test Store -$50.00");
    }
}
