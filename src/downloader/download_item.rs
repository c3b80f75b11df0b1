use std::cmp::min;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
    time::sleep,
};

use crate::descriptor::{DownloadResult, ItemDescriptor, Outcome};
use crate::source::PageSource;

use super::index::Job;

impl<S: PageSource> Job<S> {
    /// Fetch one image to disk. The existence check runs before any
    /// network call so re-runs against the same folder stay idempotent.
    pub(super) async fn download_item(&mut self, item: ItemDescriptor) -> DownloadResult {
        let outcome = self.try_download(&item).await;
        // politeness pause, success or not
        sleep(self.config.item_delay).await;
        DownloadResult {
            descriptor: item,
            outcome,
        }
    }

    async fn try_download(&mut self, item: &ItemDescriptor) -> Outcome {
        if item.image_url.is_empty() {
            return Outcome::SkippedNoImage;
        }

        let file_name = item.file_name(&mut self.seq);
        let path = format!("{}/{}", self.config.out_dir, file_name);
        if Path::new(&path).exists() {
            return Outcome::SkippedExisting;
        }

        match self.fetch_to_file(&item.image_url, &path, &file_name).await {
            Ok(byte_size) => {
                self.tally.add_byte_size(byte_size);
                Outcome::Saved
            }
            Err(e) => {
                // never leave a partial file behind as a fake success
                let _ = fs::remove_file(&path).await;
                Outcome::Failed(format!("{:#}", e))
            }
        }
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        path: &str,
        file_name: &str,
    ) -> anyhow::Result<u64> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        if !res.status().is_success() {
            anyhow::bail!("status {}", res.status());
        }

        let total_size = res.content_length().unwrap_or(0);
        let pb = create_progress_bar(total_size);
        pb.set_message(format!(
            "[page {}] {} {}",
            self.page,
            "Downloading".blue().bold(),
            file_name
        ));

        let file = fs::File::create(path)
            .await
            .with_context(|| format!("cannot create {}", path))?;
        let mut file = BufWriter::new(file);

        let mut stream = res.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(item) = stream.next().await {
            let item = item.context("connection lost mid-download")?;
            file.write_all(&item)
                .await
                .context("cannot write bytes to file")?;
            downloaded = if total_size > 0 {
                min(downloaded + item.len() as u64, total_size)
            } else {
                downloaded + item.len() as u64
            };
            pb.set_position(downloaded);
        }

        file.flush().await.context("file.flush")?;
        pb.finish_and_clear();
        Ok(downloaded)
    }
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})").unwrap()
            .progress_chars("#>-"));
    pb
}
