use std::{io, process::exit, time::Duration};

use artfetch::{
    config::JobConfig,
    declare,
    downloader::Job,
    request,
    source::{ARCA_BASE, ApiSource, PageSource, RenderedSource, WIKIART_BASE, WorklistSource},
};
use clap::{CommandFactory, Parser, command};
use clap_complete::{Shell, generate};
use colored::Colorize;

/// Command line arguments structure for artfetch
#[derive(Parser)]
#[command(name = "artfetch", version, about)]
struct Args {
    /// Numeric ARCA author id, downloaded through the JSON API
    #[arg(short, long, value_name = "Id", conflicts_with_all = ["search", "artist"])]
    author: Option<u64>,
    /// Search term for the ARCA search UI (needs a running WebDriver)
    #[arg(short, long, value_name = "Term", conflicts_with = "artist")]
    search: Option<String>,
    /// WikiArt artist slug, e.g. fernando-botero
    #[arg(short = 'A', long, value_name = "Slug")]
    artist: Option<String>,
    /// Output directory for downloaded images
    #[arg(short, long)]
    out: Option<String>,
    /// Pause between item downloads, in milliseconds
    #[arg(long, default_value_t = declare::ITEM_DELAY_MS, value_name = "Ms")]
    delay_ms: u64,
    /// Pause after a pagination click, in milliseconds
    #[arg(long, default_value_t = declare::SETTLE_DELAY_MS, value_name = "Ms")]
    settle_ms: u64,
    /// HTTP request timeout, in seconds
    #[arg(long, default_value_t = declare::REQUEST_TIMEOUT_SEC, value_name = "Secs")]
    timeout_secs: u64,
    /// How long to wait for search results to render, in seconds
    #[arg(long, default_value_t = declare::UI_WAIT_TIMEOUT_SEC, value_name = "Secs")]
    wait_secs: u64,
    /// WebDriver endpoint used by --search
    #[arg(long, default_value = "http://localhost:4444", value_name = "Url")]
    webdriver: String,
    /// Generate shell completion scripts for the specified shell
    #[arg(short, long)]
    completion: Option<Shell>,
}

impl Args {
    fn config(&self, slug: &str) -> JobConfig {
        let out_dir = match &self.out {
            Some(dir) => dir.clone(),
            None => format!("raw_images/{}", slug),
        };
        let mut config = JobConfig::new(out_dir);
        config.item_delay = Duration::from_millis(self.delay_ms);
        config.settle_delay = Duration::from_millis(self.settle_ms);
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config.ui_wait_timeout = Duration::from_secs(self.wait_secs);
        config
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Handle shell completion generation if requested
    if let Some(shell) = &args.completion {
        let mut args_cli = Args::command();
        generate(*shell, &mut args_cli, "artfetch", &mut io::stdout());
        return;
    }

    let result = if let Some(author_id) = args.author {
        let config = args.config(&format!("author_{}", author_id));
        match request::new(config.request_timeout) {
            Ok(client) => {
                let source = ApiSource::new(client.clone(), ARCA_BASE, author_id);
                run(Job::new(source, client, config)).await
            }
            Err(e) => Err(e),
        }
    } else if let Some(term) = &args.search {
        let config = args.config(&term.to_lowercase().replace(' ', "_"));
        match request::new(config.request_timeout) {
            Ok(client) => {
                match RenderedSource::connect(
                    &args.webdriver,
                    ARCA_BASE,
                    term.as_str(),
                    config.settle_delay,
                    config.ui_wait_timeout,
                )
                .await
                {
                    Ok(source) => run(Job::new(source, client, config)).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    } else if let Some(artist) = &args.artist {
        let config = args.config(artist);
        match request::new(config.request_timeout) {
            Ok(client) => {
                let source = WorklistSource::new(client.clone(), WIKIART_BASE, artist.as_str());
                run(Job::new(source, client, config)).await
            }
            Err(e) => Err(e),
        }
    } else {
        // Show help message if no target is provided
        let _ = Args::command().print_help();
        return;
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        exit(1);
    }
    println!("{}", "Done!".green());
}

/// Run the job and always print the tally, even when the run aborts.
async fn run<S: PageSource>(mut job: Job<S>) -> anyhow::Result<()> {
    let result = job.run().await;
    job.print_reports();
    result
}
