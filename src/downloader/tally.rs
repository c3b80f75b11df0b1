use crate::descriptor::{DownloadResult, Outcome};

/// Cumulative per-outcome counts for one run. Rebuilt from scratch every
/// run; resumability comes from files already on disk, not from here.
#[derive(Default)]
pub struct Tally {
    saved: u64,
    skipped_existing: u64,
    skipped_no_image: u64,
    /// item title plus the reason it failed.
    failed: Vec<(String, String)>,
    byte_size: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &DownloadResult) {
        match &result.outcome {
            Outcome::Saved => self.saved += 1,
            Outcome::SkippedExisting => self.skipped_existing += 1,
            Outcome::SkippedNoImage => self.skipped_no_image += 1,
            Outcome::Failed(reason) => self
                .failed
                .push((result.descriptor.title.clone(), reason.clone())),
        }
    }

    pub fn add_byte_size(&mut self, byte_size: u64) {
        self.byte_size += byte_size;
    }

    pub fn saved(&self) -> u64 {
        self.saved
    }

    pub fn skipped_existing(&self) -> u64 {
        self.skipped_existing
    }

    pub fn skipped_no_image(&self) -> u64 {
        self.skipped_no_image
    }

    pub fn failed(&self) -> &[(String, String)] {
        &self.failed
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ItemDescriptor;

    fn result(outcome: Outcome) -> DownloadResult {
        DownloadResult {
            descriptor: ItemDescriptor::new(Some("1".into()), "t", "http://x/i.jpg"),
            outcome,
        }
    }

    #[test]
    fn record_accumulates_per_outcome() {
        let mut tally = Tally::new();
        tally.record(&result(Outcome::Saved));
        tally.record(&result(Outcome::Saved));
        tally.record(&result(Outcome::SkippedExisting));
        tally.record(&result(Outcome::SkippedNoImage));
        tally.record(&result(Outcome::Failed("status 404".into())));

        assert_eq!(tally.saved(), 2);
        assert_eq!(tally.skipped_existing(), 1);
        assert_eq!(tally.skipped_no_image(), 1);
        assert_eq!(tally.failed().len(), 1);
        assert_eq!(tally.failed()[0].1, "status 404");
    }
}
