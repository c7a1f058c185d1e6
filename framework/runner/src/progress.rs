use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Displays a progress bar while the test is running to show the user how many virtual users
/// have finished.
pub(crate) fn start_progress(total_users: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_users as u64);
    match ProgressStyle::with_template(
        "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} users finished [{elapsed_precise}]",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::warn!("Failed to set progress style: {e}"),
    }
    pb.enable_steady_tick(Duration::from_millis(250));

    pb
}
