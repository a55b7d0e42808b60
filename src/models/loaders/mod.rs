pub mod toml_loader;

pub use toml_loader::{load_site_profile, load_site_profile_or_default};
