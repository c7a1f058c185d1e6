use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::io::{BufRead, Read, Write};
use std::path::Path;

/// Summary of a load test run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The endpoint the virtual users were sent to
    pub target_url: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// The number of virtual users configured
    pub total_users: usize,
    /// The number of workflow steps each user answers
    pub step_count: usize,
    /// The pause after every user action, in milliseconds
    pub action_delay_ms: u64,
    /// The number of users that reached the results page
    pub completed: usize,
    /// The number of users that failed at some point in the workflow
    ///
    /// Always `total_users - completed`.
    pub failed: usize,
    /// Wall time from launching the first user to the last user finishing, in milliseconds
    pub elapsed_ms: u64,
    /// The version of Stampede that was used for this run
    pub stampede_version: String,
}

impl RunSummary {
    /// Compute a fingerprint for this run summary
    ///
    /// The fingerprint identifies the configuration used for the run, so that runs of the same
    /// configuration can be compared. It uses the
    ///     - Target URL
    ///     - Total users
    ///     - Step count
    ///     - Action delay
    ///     - Stampede version
    ///
    /// The fingerprint is computed using [sha3::Sha3_256].
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.target_url.as_bytes());
        Digest::update(&mut hasher, (self.total_users as u64).to_le_bytes());
        Digest::update(&mut hasher, (self.step_count as u64).to_le_bytes());
        Digest::update(&mut hasher, self.action_delay_ms.to_le_bytes());
        Digest::update(&mut hasher, self.stampede_version.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: &RunSummary, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: &RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run_summary)?;
    Ok(())
}

/// Load a run summary from a reader
pub fn load_run_summary<R: Read>(reader: R) -> anyhow::Result<RunSummary> {
    let reader = std::io::BufReader::new(reader);
    let run_summary: RunSummary = serde_json::from_reader(reader)?;
    Ok(run_summary)
}

/// Load run summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_summary].
pub fn load_summary_runs(path: impl AsRef<Path>) -> anyhow::Result<Vec<RunSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let run: RunSummary = serde_json::from_str(&line)?;
        runs.push(run);
    }
    Ok(runs)
}
