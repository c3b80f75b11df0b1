use crate::declare::TITLE_MAX_LEN;

/// One artwork prior to download: where its image lives and what to call it.
#[derive(Clone, Debug)]
pub struct ItemDescriptor {
    pub id: Option<String>,
    pub title: String,
    /// Empty when the source could not resolve an image for this item.
    pub image_url: String,
}

/// What happened to a single item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    SkippedExisting,
    SkippedNoImage,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct DownloadResult {
    pub descriptor: ItemDescriptor,
    pub outcome: Outcome,
}

impl ItemDescriptor {
    pub fn new(
        id: Option<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
        }
    }

    /// Target filename for this item. The id keeps same-titled items apart;
    /// `seq` is consumed instead when the source supplied no id.
    pub fn file_name(&self, seq: &mut u32) -> String {
        let title = sanitize_title(&self.title);
        match &self.id {
            Some(id) => format!("{}_{}.jpg", id, title),
            None => {
                let n = *seq;
                *seq += 1;
                format!("{}_{:03}.jpg", title, n)
            }
        }
    }
}

/// Strip characters illegal in filenames and bound the length so long
/// titles cannot blow past filesystem path limits.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    let cleaned: String = cleaned.trim().chars().take(TITLE_MAX_LEN).collect();
    let cleaned = cleaned.trim_end().trim_end_matches(',');
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}
