mod operations_table;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use tabled::settings::Style;
use tabled::Table;

use crate::OperationRecord;

pub use operations_table::OperationRow;

/// Per-operation timing summary, one row per operation id in name order.
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    rows: Vec<OperationRow>,
}

impl SummaryReport {
    pub(crate) fn from_records(records: &[OperationRecord]) -> Self {
        let rows = records
            .iter()
            .fold(BTreeMap::<&str, Vec<&OperationRecord>>::new(), |mut acc, record| {
                acc.entry(record.operation_id.as_str())
                    .or_default()
                    .push(record);
                acc
            })
            .into_iter()
            .map(|(operation_id, operations)| summarise_operation(operation_id, &operations))
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[OperationRow] {
        &self.rows
    }
}

fn summarise_operation(operation_id: &str, operations: &[&OperationRecord]) -> OperationRow {
    let total_operations = operations.len();
    let errors = operations.iter().filter(|op| op.is_error).count();
    let total_duration_micro = operations
        .iter()
        .map(|record| record.duration().as_micros())
        .sum::<u128>();

    // Failed operations often end on a timeout, so min and max only look at the successful ones
    // unless nothing succeeded.
    let successful = operations
        .iter()
        .filter(|op| !op.is_error)
        .map(|op| op.duration())
        .collect::<Vec<_>>();
    let timings = if successful.is_empty() {
        operations.iter().map(|op| op.duration()).collect()
    } else {
        successful
    };

    OperationRow {
        operation_id: operation_id.to_string(),
        total_operations,
        errors,
        total_duration_ms: total_duration_micro as f64 / 1000.0,
        avg_time_ms: (total_duration_micro as f64 / total_operations as f64) / 1000.0,
        min_time_ms: as_ms(timings.iter().min().copied().unwrap_or_default()),
        max_time_ms: as_ms(timings.iter().max().copied().unwrap_or_default()),
    }
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

impl Display for SummaryReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nSummary of operations")?;
        let mut table = Table::new(&self.rows);
        table.with(Style::modern());
        write!(f, "{table}")
    }
}
