// politeness pause between item downloads.
pub const ITEM_DELAY_MS: u64 = 500;
// pause after a pagination click, lets client-side rendering settle.
pub const SETTLE_DELAY_MS: u64 = 2000;

pub const REQUEST_TIMEOUT_SEC: u64 = 30;
pub const UI_WAIT_TIMEOUT_SEC: u64 = 20;

/// filenames keep at most this many title characters.
pub const TITLE_MAX_LEN: usize = 50;

/// work-list entries resolved per pagination step.
pub const WORKLIST_CHUNK: usize = 24;
