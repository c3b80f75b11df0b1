use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use fantoccini::{Client, ClientBuilder, Locator, error::CmdError};
use regex::Regex;
use tokio::time::sleep;
use url::Url;

use crate::descriptor::ItemDescriptor;
use crate::source::{PageBatch, PageSource};

// Markup contract of the search UI. Everything brittle lives in this file.
const RESULTS_MARKER: &str = "div.artwork-thumbnail";
const IMG_WRAP: &str = "#img-wrap";
const CAPTION: &str = ".caption";
const SEARCH_BOX: &str = "#search";
const SEARCH_BUTTON: &str = "i.fa-search";
const NEXT_ENABLED: &str = "li.next:not(.disabled) a";

/// Search UI driven through a WebDriver session. Thumbnails carry their
/// image in an inline `background-image` style and their id in the anchor
/// href; pagination is a "next" control that loses its enabled state on
/// the last page.
pub struct RenderedSource {
    browser: Client,
    base: String,
    term: String,
    settle_delay: Duration,
    wait_timeout: Duration,
    started: bool,
}

impl RenderedSource {
    pub async fn connect(
        webdriver: &str,
        base: impl Into<String>,
        term: impl Into<String>,
        settle_delay: Duration,
        wait_timeout: Duration,
    ) -> Result<Self> {
        let browser = ClientBuilder::native()
            .connect(webdriver)
            .await
            .with_context(|| format!("cannot reach webdriver at {}", webdriver))?;
        Ok(Self {
            browser,
            base: base.into(),
            term: term.into(),
            settle_delay,
            wait_timeout,
            started: false,
        })
    }

    /// Open the search page and submit the query once per run.
    async fn start_search(&mut self) -> Result<()> {
        let search_url = format!("{}/artworks", self.base);
        println!("opening {}", search_url.purple());
        self.browser
            .goto(&search_url)
            .await
            .context("cannot open search page")?;

        let search_box = self
            .browser
            .wait()
            .at_most(self.wait_timeout)
            .for_element(Locator::Css(SEARCH_BOX))
            .await
            .context("search box never appeared")?;
        search_box
            .send_keys(&self.term)
            .await
            .context("cannot type search term")?;
        self.browser
            .find(Locator::Css(SEARCH_BUTTON))
            .await
            .context("search button not found")?
            .click()
            .await
            .context("cannot submit search")?;
        Ok(())
    }

    /// Read every thumbnail in the current DOM state. Thumbnails that miss
    /// any expected piece are skipped, not fatal.
    async fn harvest(&mut self) -> Result<Vec<ItemDescriptor>> {
        match self
            .browser
            .wait()
            .at_most(self.wait_timeout)
            .for_element(Locator::Css(RESULTS_MARKER))
            .await
        {
            Ok(_) => {}
            // the marker never showed up: treat as an empty last page
            Err(CmdError::WaitTimeout) => {
                println!(" -- {}", "NONE".yellow().bold());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e).context("waiting for search results"),
        }

        let thumbnails = self
            .browser
            .find_all(Locator::Css(RESULTS_MARKER))
            .await
            .context("cannot enumerate thumbnails")?;

        let mut items = Vec::new();
        for thumb in thumbnails {
            let Some(wrap) = thumb
                .find_all(Locator::Css(IMG_WRAP))
                .await
                .unwrap_or_default()
                .into_iter()
                .next()
            else {
                continue;
            };
            let style = wrap.attr("style").await.ok().flatten().unwrap_or_default();
            let Some(rel) = style_image_url(&style) else {
                continue;
            };
            let Some(image_url) = absolutize(&self.base, rel) else {
                continue;
            };

            let title = match thumb
                .find_all(Locator::Css(CAPTION))
                .await
                .unwrap_or_default()
                .into_iter()
                .next()
            {
                Some(caption) => {
                    let text = caption.text().await.unwrap_or_default();
                    text.lines().next().unwrap_or("").trim().to_string()
                }
                None => String::new(),
            };

            let id = match thumb
                .find_all(Locator::Css("a"))
                .await
                .unwrap_or_default()
                .into_iter()
                .next()
            {
                Some(anchor) => anchor
                    .attr("href")
                    .await
                    .ok()
                    .flatten()
                    .and_then(|href| id_from_href(&href)),
                None => None,
            };

            items.push(ItemDescriptor::new(id, title, image_url));
        }
        Ok(items)
    }

    /// Click the "next" control if it is present and enabled. Returns
    /// whether another page is coming.
    async fn advance(&mut self) -> Result<bool> {
        let next = self
            .browser
            .find_all(Locator::Css(NEXT_ENABLED))
            .await
            .context("cannot inspect pagination")?;
        let Some(next) = next.into_iter().next() else {
            return Ok(false);
        };
        next.click().await.context("cannot click next page")?;
        sleep(self.settle_delay).await;
        Ok(true)
    }
}

impl PageSource for RenderedSource {
    async fn next_page(&mut self) -> Result<PageBatch> {
        if !self.started {
            self.start_search().await?;
            self.started = true;
        }
        let items = self.harvest().await?;
        if items.is_empty() {
            return Ok(PageBatch { items, more: false });
        }
        let more = self.advance().await?;
        Ok(PageBatch { items, more })
    }

    async fn close(&mut self) -> Result<()> {
        self.browser
            .clone()
            .close()
            .await
            .context("cannot end webdriver session")
    }
}

/// Pull the url out of an inline `background-image: url(...)` style.
fn style_image_url(style: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"url\(['"]?(.*?)['"]?\)"#).expect("valid url pattern")
    });
    re.captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

fn absolutize(base: &str, rel: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    Some(base.join(rel).ok()?.to_string())
}

/// Item id is the last path segment of the thumbnail's detail link.
fn id_from_href(href: &str) -> Option<String> {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
