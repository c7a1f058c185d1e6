use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stampede_runner::prelude::*;
use webdriver_client::prelude::{Browser, WebDriverClient};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    load_test: LoadTestCli,

    /// The WebDriver server that starts the browsers, e.g. `chromedriver --port=4444`
    #[clap(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    /// The browser to run each virtual user in
    #[clap(long, default_value = "chrome")]
    browser: Browser,
}

fn main() -> StampedeResult<()> {
    let cli = init::<Cli>();

    let builder = LoadTestBuilder::from_cli(&cli.load_test)?;
    log::info!(
        "Running {} users against {} with {}",
        builder.config().total_users,
        builder.config().target_url,
        cli.browser
    );

    let client = WebDriverClient::new(&cli.webdriver_url, cli.browser)
        .with_context(|| format!("Invalid WebDriver url: {}", cli.webdriver_url))?;

    let result = builder.run(Arc::new(client))?;

    println!("{}", summarize(&result));

    if let Some(summary_file) = &cli.load_test.summary_file {
        append_run_summary(&result.to_run_summary(), summary_file)
            .with_context(|| format!("Failed to write run summary to {}", summary_file.display()))?;
    }

    if cli.load_test.fail_on_error && result.failed() > 0 {
        anyhow::bail!("{} of {} users failed", result.failed(), result.total_users);
    }

    Ok(())
}
