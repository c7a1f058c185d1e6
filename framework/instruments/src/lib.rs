mod report;

use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub use report::{OperationRow, SummaryReport};

/// Timing for a single driver operation, such as a click or a navigation.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub operation_id: String,
    started: Instant,
    pub elapsed: Option<Duration>,
    pub is_error: bool,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    /// The measured duration, or the time since the operation started if it has not finished yet.
    pub fn duration(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }
}

/// Finish `record` and hand it to the reporter, marking it as an error if `response` is one.
pub fn report_operation<T, E>(
    reporter: &Reporter,
    mut record: OperationRecord,
    response: &Result<T, E>,
) {
    record.elapsed = Some(record.started.elapsed());
    record.is_error = response.is_err();
    reporter.add_operation(record);
}

#[derive(Debug, Default)]
pub struct ReportConfig {
    summary: bool,
}

impl ReportConfig {
    /// Print a table summarising every operation when the reporter is finalized.
    pub fn enable_summary(mut self) -> Self {
        self.summary = true;
        self
    }

    pub fn init(self) -> Reporter {
        Reporter {
            print_summary: self.summary,
            records: Mutex::new(Vec::new()),
        }
    }
}

/// Collects operation records from every virtual user for the duration of a run.
#[derive(Debug)]
pub struct Reporter {
    print_summary: bool,
    records: Mutex<Vec<OperationRecord>>,
}

impl Reporter {
    pub fn add_operation(&self, record: OperationRecord) {
        log::trace!(
            "Operation {} took {:?}, error: {}",
            record.operation_id,
            record.duration(),
            record.is_error
        );
        self.records.lock().push(record);
    }

    pub fn operation_count(&self) -> usize {
        self.records.lock().len()
    }

    /// Build the per-operation summary from everything recorded so far.
    pub fn summary(&self) -> SummaryReport {
        SummaryReport::from_records(&self.records.lock())
    }

    pub fn finalize(&self) {
        if self.print_summary {
            println!("{}", self.summary());
        }
    }
}
