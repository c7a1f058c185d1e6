use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::run::AggregateResult;

#[derive(Tabled)]
struct FailedUserRow {
    user: usize,
    #[tabled(display = "float2")]
    elapsed_s: f64,
    error: String,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// Render the human readable summary of a finished run.
///
/// The output only depends on `result`, so it can be compared in tests. Writing it out is up to
/// the caller.
pub fn summarize(result: &AggregateResult) -> String {
    let mut lines = vec![
        "--- Load Test Results ---".to_string(),
        format!("Total users: {}", result.total_users),
        format!("Completed: {}", result.completed()),
        format!("Failed: {}", result.failed()),
        format!("Success ratio: {:.2}%", result.success_ratio() * 100.0),
        format!("Total time: {:.2} seconds", result.elapsed().as_secs_f64()),
        format!(
            "Average time per user: {:.2} seconds",
            result.average_per_user_secs()
        ),
    ];

    let failed_rows = result
        .users
        .iter()
        .filter(|user| !user.is_completed())
        .map(|user| FailedUserRow {
            user: user.user_id,
            elapsed_s: user.elapsed().as_secs_f64(),
            error: user
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    if !failed_rows.is_empty() {
        let mut table = Table::new(failed_rows);
        table.with(Style::modern());

        lines.push(String::new());
        lines.push("Failed users".to_string());
        lines.push(table.to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfiguration;
    use crate::user::{SimulationError, TerminalState, UserResult};
    use stampede_core::prelude::DriverError;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn user(user_id: usize, start: Instant, error: Option<SimulationError>) -> UserResult {
        UserResult {
            user_id,
            state: match error {
                Some(_) => TerminalState::Failed,
                None => TerminalState::Completed,
            },
            started: start,
            ended: start + Duration::from_millis(1500),
            error,
            selections: Vec::new(),
        }
    }

    fn aggregate(users: Vec<UserResult>, elapsed: Duration) -> AggregateResult {
        let start = users
            .first()
            .map(|user| user.started)
            .unwrap_or_else(Instant::now);
        AggregateResult {
            run_id: "test-run".to_string(),
            config: Arc::new(RunConfiguration::default()),
            total_users: users.len(),
            started_at: chrono::Utc::now(),
            start,
            end: start + elapsed,
            users,
        }
    }

    #[test]
    fn all_completed_summary() {
        let start = Instant::now();
        let result = aggregate(
            (1..=3).map(|id| user(id, start, None)).collect(),
            Duration::from_secs(3),
        );

        pretty_assertions::assert_eq!(
            "--- Load Test Results ---\n\
             Total users: 3\n\
             Completed: 3\n\
             Failed: 0\n\
             Success ratio: 100.00%\n\
             Total time: 3.00 seconds\n\
             Average time per user: 1.00 seconds",
            summarize(&result)
        );
    }

    #[test]
    fn failures_are_listed() {
        let start = Instant::now();
        let result = aggregate(
            vec![
                user(1, start, None),
                user(
                    2,
                    start,
                    Some(
                        DriverError::selector_timeout(".grid button", Duration::from_secs(30))
                            .into(),
                    ),
                ),
            ],
            Duration::from_secs(4),
        );

        let summary = summarize(&result);

        assert!(summary.contains("Completed: 1\n"));
        assert!(summary.contains("Failed: 1\n"));
        assert!(summary.contains("Success ratio: 50.00%"));
        assert!(summary.contains("Average time per user: 2.00 seconds"));
        assert!(summary.contains("Failed users"));
        assert!(summary.contains("timed out after 30s waiting for selector `.grid button`"));
    }

    #[test]
    fn summary_is_deterministic() {
        let start = Instant::now();
        let result = aggregate(
            vec![user(1, start, Some(SimulationError::Cancelled))],
            Duration::from_secs(1),
        );

        assert_eq!(summarize(&result), summarize(&result));
    }
}
