pub mod logging;
pub mod naming;

pub use naming::{archive_dir, archive_filename, review_dir, sanitize_market};
