pub mod archive_request;
pub mod loaders;
pub mod outcome;
pub mod period;
pub mod report;
pub mod scrape_config;
pub mod site_profile;

pub use archive_request::ArchiveRequest;
pub use loaders::{load_site_profile, load_site_profile_or_default};
pub use outcome::DownloadOutcome;
pub use period::{parse_title_date, parse_title_date_loose, period_value, Period};
pub use report::{ArchiveKey, ParsedReport, ReportCandidate};
pub use scrape_config::{Pacing, ScrapeConfig};
pub use site_profile::SiteProfile;
