use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::declare::WORKLIST_CHUNK;
use crate::descriptor::ItemDescriptor;
use crate::source::{PageBatch, PageSource};

pub const WIKIART_BASE: &str = "https://www.wikiart.org";

/// WikiArt publishes an artist's complete work list as one server-rendered
/// page; every entry then needs its own page fetch to expose the
/// full-resolution image. Fixed-size chunks of the list act as pages.
pub struct WorklistSource {
    client: Client,
    base: String,
    artist: String,
    links: Option<Vec<(String, String)>>,
    cursor: usize,
}

impl WorklistSource {
    pub fn new(client: Client, base: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
            artist: artist.into(),
            links: None,
            cursor: 0,
        }
    }

    /// One fetch of the artist's full text list. Fatal when it fails; there
    /// is nothing to resume from without it.
    async fn fetch_list(&self) -> Result<Vec<(String, String)>> {
        let url = format!("{}/en/{}/all-works/text-list", self.base, self.artist);
        print!("fetching {}", url.purple());
        let res = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                println!(" -- {}", "FAILED".red().bold());
                return Err(e).context("request for work list failed");
            }
        };
        if !res.status().is_success() {
            println!(" -- {}", "FAILED".red().bold());
            anyhow::bail!("work list returned status {}", res.status());
        }
        let text = res.text().await.context("cannot read work list body")?;
        let links = parse_work_list(&text, &self.base);
        if links.is_empty() {
            println!(" -- {}", "NONE".yellow().bold());
        } else {
            println!(" -- {}", "PASS".green().bold());
        }
        Ok(links)
    }

    /// Visit one painting page and pull the full-resolution image url. A
    /// painting that cannot be resolved stays imageless and is counted as
    /// a skip downstream.
    async fn resolve_item(&self, title: &str, page_url: &str) -> ItemDescriptor {
        let image_url = match self.client.get(page_url).send().await {
            Ok(res) if res.status().is_success() => match res.text().await {
                Ok(text) => parse_image_src(&text).unwrap_or_default(),
                Err(_) => String::new(),
            },
            _ => String::new(),
        };
        ItemDescriptor::new(None, title, image_url)
    }
}

impl PageSource for WorklistSource {
    async fn next_page(&mut self) -> Result<PageBatch> {
        if self.links.is_none() {
            self.links = Some(self.fetch_list().await?);
        }
        let (chunk, total) = {
            let links = self.links.as_ref().expect("work list just fetched");
            let chunk: Vec<(String, String)> = links
                .iter()
                .skip(self.cursor)
                .take(WORKLIST_CHUNK)
                .cloned()
                .collect();
            (chunk, links.len())
        };
        self.cursor += chunk.len();
        let more = self.cursor < total;

        let mut items = Vec::with_capacity(chunk.len());
        for (title, page_url) in &chunk {
            items.push(self.resolve_item(title, page_url).await);
        }
        Ok(PageBatch { items, more })
    }
}

/// Extract (title, absolute painting url) pairs from the text list markup.
fn parse_work_list(html: &str, base: &str) -> Vec<(String, String)> {
    let selector = Selector::parse("ul.painting-list-text a").expect("valid css selector");
    let base = match Url::parse(base) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = base.join(href).ok()?;
            let title = a.text().collect::<String>().trim().to_string();
            Some((title, url.to_string()))
        })
        .collect()
}

/// The full-resolution image sits in the artist-image wrapper of a
/// painting page.
fn parse_image_src(html: &str) -> Option<String> {
    let selector =
        Selector::parse("div.wiki-layout-artist-image-wrapper img").expect("valid css selector");
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.to_string())
}
