//! Data models for the uploader.
//!
//! - [`Settings`]: general settings loaded from `Config.json`
//! - [`Credentials`]: account secrets loaded from `creds.secret`
//! - [`Timeouts`]: per-step wait budgets for the browser automation
//! - [`LinkMap`]: derived file name → direct URL, in scrape order

pub mod config;

pub use config::{Credentials, Settings, Timeouts};

use indexmap::IndexMap;

/// Derived file name → direct link, kept in the order the links were scraped.
pub type LinkMap = IndexMap<String, String>;
