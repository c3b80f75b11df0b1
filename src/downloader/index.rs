use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::Client;
use tokio::fs;

use crate::config::JobConfig;
use crate::descriptor::{DownloadResult, Outcome};
use crate::source::PageSource;

use super::tally::Tally;

/// Sequences one source against the downloader: fetch a page, drain it
/// item by item, advance until the source runs out. Strictly sequential;
/// the output directory belongs to this job for the duration of the run.
pub struct Job<S: PageSource> {
    pub(super) source: S,
    pub(super) client: Client,
    pub(super) config: JobConfig,
    pub(super) tally: Tally,
    /// 1-based page index, carried into fatal error reports.
    pub(super) page: u64,
    /// counter for filenames of items without an id.
    pub(super) seq: u32,
}

impl<S: PageSource> Job<S> {
    pub fn new(source: S, client: Client, config: JobConfig) -> Self {
        Self {
            source,
            client,
            config,
            tally: Tally::new(),
            page: 1,
            seq: 1,
        }
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Drive the job to completion. A source failure aborts the run with
    /// the page index attached; item failures are recorded in the tally
    /// and the run continues.
    pub async fn run(&mut self) -> Result<()> {
        fs::create_dir_all(&self.config.out_dir)
            .await
            .with_context(|| format!("cannot create output directory {}", self.config.out_dir))?;

        loop {
            let batch = match self.source.next_page().await {
                Ok(batch) => batch,
                Err(e) => {
                    let _ = self.source.close().await;
                    return Err(e)
                        .with_context(|| format!("job aborted while fetching page {}", self.page));
                }
            };

            for item in batch.items {
                let result = self.download_item(item).await;
                report(&result);
                self.tally.record(&result);
            }

            if !batch.more {
                break;
            }
            self.page += 1;
        }

        let _ = self.source.close().await;
        Ok(())
    }
}

/// One console line per item, as the outcome happens.
fn report(result: &DownloadResult) {
    let title = &result.descriptor.title;
    match &result.outcome {
        Outcome::Saved => println!(" {}\t{}", "Saved".green(), title),
        Outcome::SkippedExisting => println!(" {}\t{}", "Exists".yellow(), title),
        Outcome::SkippedNoImage => println!(" {}\t{}", "NoImage".yellow(), title),
        Outcome::Failed(reason) => {
            println!(" {}\t{} ({})", "Failed".red(), title.red(), reason)
        }
    }
}
