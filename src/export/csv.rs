//! CSV Export functionality
//!
//! Writes label trend series and labelled transaction lists as CSV.

use std::io::Write;

use crate::engine::{Engine, MonthlyAmount};
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::LabelId;

/// Write a monthly series as `period,amount`
pub fn export_series_csv<W: Write>(series: &[MonthlyAmount], writer: W) -> LabelbookResult<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(["period", "amount"])?;
    for month in series {
        csv.write_record([month.period.to_string(), month.amount.to_decimal_string()])?;
    }
    csv.flush()
        .map_err(|e| LabelbookError::Export(e.to_string()))
}

/// Write every transaction carrying a label, with its contribution to that label
pub fn export_label_transactions_csv<W: Write>(
    engine: &Engine,
    label_id: LabelId,
    writer: W,
) -> LabelbookResult<()> {
    let contributions = engine.contributions(label_id)?;
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(["id", "date", "account", "payee", "amount", "attributed"])?;

    for c in contributions {
        let Some(txn) = engine.transaction(&c.transaction_id) else {
            continue;
        };
        csv.write_record([
            txn.id.to_string(),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.account_id.to_string(),
            engine.display_payee(txn),
            txn.amount.to_decimal_string(),
            c.amount.to_decimal_string(),
        ])?;
    }

    csv.flush()
        .map_err(|e| LabelbookError::Export(e.to_string()))
}
