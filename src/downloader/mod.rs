// private
mod download_item;
mod index;
mod print;
mod tally;

// public
pub use index::Job;
pub use tally::Tally;
