use anyhow::{Context, Result};
use colored::Colorize;
use json::JsonValue;
use reqwest::Client;

use crate::descriptor::ItemDescriptor;
use crate::source::{PageBatch, PageSource};

pub const ARCA_BASE: &str = "https://arcav1.uniandes.edu.co";

/// Paginated ARCA artworks API: one GET per page, JSON envelope with a
/// `data` list and a `last_page` count.
pub struct ApiSource {
    client: Client,
    base: String,
    author_id: u64,
    page: u64,
}

impl ApiSource {
    pub fn new(client: Client, base: impl Into<String>, author_id: u64) -> Self {
        Self {
            client,
            base: base.into(),
            author_id,
            page: 1,
        }
    }

    fn page_url(&self) -> String {
        format!(
            "{}/api/artworks?page={}&author_show={}",
            self.base, self.page, self.author_id
        )
    }
}

/// Map one API record to a descriptor. The `large` image variant wins,
/// `medium` is the fallback; a record with neither keeps an empty url and
/// is counted as a skip downstream.
fn record_to_item(record: &JsonValue) -> ItemDescriptor {
    let id = (!record["id"].is_null()).then(|| record["id"].to_string());
    let title = record["title"].as_str().unwrap_or("untitled").to_string();
    let image = &record["image"];
    let image_url = image["large"]
        .as_str()
        .or_else(|| image["medium"].as_str())
        .unwrap_or("")
        .to_string();
    ItemDescriptor {
        id,
        title,
        image_url,
    }
}

impl PageSource for ApiSource {
    async fn next_page(&mut self) -> Result<PageBatch> {
        let url = self.page_url();
        print!("fetching {}", url.purple());

        let res = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                println!(" -- {}", "FAILED".red().bold());
                return Err(e).with_context(|| format!("request for page {} failed", self.page));
            }
        };
        if !res.status().is_success() {
            println!(" -- {}", "FAILED".red().bold());
            anyhow::bail!("page {} returned status {}", self.page, res.status());
        }

        let text = res
            .text()
            .await
            .with_context(|| format!("cannot read body of page {}", self.page))?;
        let obj = json::parse(&text)
            .with_context(|| format!("cannot parse JSON of page {}", self.page))?;

        let records = &obj["data"];
        let items: Vec<ItemDescriptor> = (0..records.len())
            .map(|i| record_to_item(&records[i]))
            .collect();

        if items.is_empty() {
            println!(" -- {}", "NONE".yellow().bold());
            return Ok(PageBatch {
                items,
                more: false,
            });
        }
        println!(" -- {}", "PASS".green().bold());

        let last_page = obj["last_page"].as_u64().unwrap_or(1);
        let more = self.page < last_page;
        self.page += 1;
        Ok(PageBatch { items, more })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_maps_large_variant() {
        let obj = json::parse(
            r#"{"id": 101, "title": "Paisaje", "image": {"large": "/img/l.jpg", "medium": "/img/m.jpg"}}"#,
        )
        .unwrap();
        let item = record_to_item(&obj);
        assert_eq!(item.id.as_deref(), Some("101"));
        assert_eq!(item.title, "Paisaje");
        assert_eq!(item.image_url, "/img/l.jpg");
    }

    #[test]
    fn record_falls_back_to_medium() {
        let obj = json::parse(r#"{"id": 5, "title": "t", "image": {"medium": "/img/m.jpg"}}"#)
            .unwrap();
        assert_eq!(record_to_item(&obj).image_url, "/img/m.jpg");
    }

    #[test]
    fn record_without_image_keeps_empty_url() {
        let obj = json::parse(r#"{"id": 7, "title": "sin imagen"}"#).unwrap();
        let item = record_to_item(&obj);
        assert!(item.image_url.is_empty());
    }

    #[test]
    fn record_without_id_or_title() {
        let obj = json::parse(r#"{"image": {"large": "/x.jpg"}}"#).unwrap();
        let item = record_to_item(&obj);
        assert!(item.id.is_none());
        assert_eq!(item.title, "untitled");
    }
}
