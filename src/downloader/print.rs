use colored::Colorize;
use size::Size;

use crate::source::PageSource;

use super::index::Job;

impl<S: PageSource> Job<S> {
    /// Final tally. Printed after normal completion and after aborts alike.
    pub fn print_reports(&self) {
        let tally = &self.tally;

        for (title, reason) in tally.failed() {
            println!(" {}\t{} ({})", "Failed".red(), title.red(), reason);
        }

        println!("Downloaded to {} folder.", self.config.out_dir.blue());
        let byte_size = Size::from_bytes(tally.byte_size());
        println!("{}: {}", "Total size".blue(), byte_size);
        println!("{}: {}", "Saved files".green(), tally.saved());
        println!("{}: {}", "Already present".yellow(), tally.skipped_existing());
        println!("{}: {}", "Missing image".yellow(), tally.skipped_no_image());
        println!("{}: {}", "Failed files".red(), tally.failed().len());
    }
}
