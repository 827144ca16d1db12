//! CSV statement reader
//!
//! Expects a header row naming `id,account,date,amount,type,memo,payee`.
//! Column order does not matter; `type`, `memo` and `payee` may be omitted.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::engine::{Engine, ImportReport};
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Money, Transaction, TransactionType};

/// One raw statement row as it appears in the file
#[derive(Debug, Clone, Deserialize)]
pub struct StatementRow {
    pub id: String,
    pub account: String,
    pub date: String,
    pub amount: String,
    #[serde(default, rename = "type")]
    pub tx_type: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub payee: String,
}

impl StatementRow {
    /// Convert into a transaction
    pub fn into_transaction(self, date_format: &str) -> Result<Transaction, String> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err("Missing transaction id".to_string());
        }
        let account = self.account.trim();
        if account.is_empty() {
            return Err(format!("Missing account for {}", id));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), date_format)
            .map_err(|_| format!("Invalid date '{}' (expected {})", self.date, date_format))?;
        let amount = Money::parse(&self.amount).map_err(|e| e.to_string())?;

        Ok(Transaction::new(id, account, date, amount)
            .with_type(TransactionType::from_code(&self.tx_type))
            .with_memo(self.memo.trim())
            .with_payee(self.payee.trim()))
    }
}

/// Transactions parsed from a file plus the rows that failed
#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    /// Error message by data row number (1-based, header excluded)
    pub errors: BTreeMap<usize, String>,
}

/// Result of importing a statement into the engine
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub report: ImportReport,
    pub errors: BTreeMap<usize, String>,
}

/// Parse a statement from any reader
pub fn parse_statement<R: Read>(reader: R, date_format: &str) -> LabelbookResult<ParsedStatement> {
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for required in ["id", "account", "date", "amount"] {
        if !headers.iter().any(|h| h == required) {
            return Err(LabelbookError::Import(format!(
                "Missing required column '{}'",
                required
            )));
        }
    }

    let mut parsed = ParsedStatement::default();
    for (idx, result) in reader.deserialize::<StatementRow>().enumerate() {
        let row_number = idx + 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                parsed.errors.insert(row_number, e.to_string());
                continue;
            }
        };
        match row.into_transaction(date_format) {
            Ok(txn) => parsed.transactions.push(txn),
            Err(e) => {
                parsed.errors.insert(row_number, e);
            }
        }
    }

    Ok(parsed)
}

/// Parse a statement and import its transactions
pub fn import_csv<R: Read>(
    engine: &mut Engine,
    reader: R,
    date_format: &str,
) -> LabelbookResult<ImportSummary> {
    let parsed = parse_statement(reader, date_format)?;
    let report = engine.import_transactions(parsed.transactions);
    Ok(ImportSummary {
        report,
        errors: parsed.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    const STATEMENT: &str = "\
id,account,date,amount,type,memo,payee
FIT-1,1234,2024-03-05,-54.32,POS,POS PURCHASE,KROGER #123
FIT-2,1234,2024-03-06,2500.00,DIRECTDEP,,ACME PAYROLL
";

    #[test]
    fn test_parse_statement() {
        let parsed = parse_statement(STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.transactions.len(), 2);

        let kroger = &parsed.transactions[0];
        assert_eq!(kroger.id.as_str(), "FIT-1");
        assert_eq!(kroger.amount.cents(), -5432);
        assert_eq!(kroger.tx_type, TransactionType::Pos);
        assert_eq!(kroger.memo, "POS PURCHASE");
        assert_eq!(parsed.transactions[1].tx_type, TransactionType::DirectDeposit);
    }

    #[test]
    fn test_bad_rows_are_reported_not_fatal() {
        let data = "\
id,account,date,amount,payee
A,1234,2024-03-05,-1.005,X
B,1234,03/05/2024,-1.00,Y
C,1234,2024-03-05,-1.00,Z
";
        let parsed = parse_statement(data.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert!(parsed.errors[&1].contains("decimal places"));
        assert!(parsed.errors[&2].contains("Invalid date"));
    }

    #[test]
    fn test_missing_column_rejected() {
        let err = parse_statement("id,date,amount\n".as_bytes(), "%Y-%m-%d").unwrap_err();
        assert!(matches!(err, LabelbookError::Import(_)));
    }

    #[test]
    fn test_import_reports_duplicates() {
        let mut engine = Engine::new();
        import_csv(&mut engine, STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();
        let summary = import_csv(&mut engine, STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();

        assert!(summary.report.added.is_empty());
        assert_eq!(
            summary.report.duplicates,
            vec![TransactionId::new("FIT-1"), TransactionId::new("FIT-2")]
        );
    }
}
