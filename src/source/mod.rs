// private
mod api;
mod rendered;
mod worklist;

// public
pub use api::{ARCA_BASE, ApiSource};
pub use rendered::RenderedSource;
pub use worklist::{WIKIART_BASE, WorklistSource};

use anyhow::Result;

use crate::descriptor::ItemDescriptor;

/// One batch of descriptors from a single pagination step.
pub struct PageBatch {
    pub items: Vec<ItemDescriptor>,
    /// Whether another call may yield further items.
    pub more: bool,
}

/// A paginated stream of artwork descriptors.
///
/// Implementations own every site-specific detail (endpoints, selectors,
/// inline-style parsing) so markup drift stays out of the driver and the
/// downloader. A source never downloads images itself.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetch the next page of descriptors. A network or parse failure here
    /// is fatal to the whole job.
    async fn next_page(&mut self) -> Result<PageBatch>;

    /// Release any session held by the source.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
