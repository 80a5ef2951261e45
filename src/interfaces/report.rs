use serde::Serialize;
use std::io::Write;

use crate::domain::meter::{Meter, MeterStatus};
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::{CoreError, Result};

#[derive(Debug, Serialize)]
pub struct MeterReport {
    pub meter_number: String,
    pub balance: u64,
    pub status: MeterStatus,
}

#[derive(Debug, Serialize)]
pub struct TransactionReport {
    pub order_id: String,
    pub amount: u64,
    pub status: TransactionStatus,
}

/// Final state snapshot printed after a scenario run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub meters: Vec<MeterReport>,
    pub transactions: Vec<TransactionReport>,
}

impl Report {
    /// Builds a report with deterministic ordering: meters by number,
    /// transactions by creation time.
    pub fn build(mut meters: Vec<Meter>, mut transactions: Vec<Transaction>) -> Self {
        meters.sort_by(|a, b| a.meter_number.cmp(&b.meter_number));
        transactions.sort_by_key(|t| t.created_at);
        Self {
            meters: meters
                .into_iter()
                .map(|m| MeterReport {
                    meter_number: m.meter_number,
                    balance: m.balance,
                    status: m.status,
                })
                .collect(),
            transactions: transactions
                .into_iter()
                .map(|t| TransactionReport {
                    order_id: t.order_id,
                    amount: t.amount.value(),
                    status: t.status,
                })
                .collect(),
        }
    }
}

/// Writes the final report as pretty JSON.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)
            .map_err(|e| CoreError::Storage(format!("report write failed: {e}")))?;
        writeln!(self.writer).map_err(|e| CoreError::Storage(format!("report write failed: {e}")))
    }
}
