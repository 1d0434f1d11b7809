// mawaqit-api: Async Rust client for the Mawaqit prayer-times API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod mosques;
mod prayer_times;
pub mod transport;

pub use auth::{Credentials, Token, UNSET_TOKEN};
pub use client::MawaqitClient;
pub use error::Error;
pub use models::{MonthTable, MosqueRecord, PrayerTimes};
pub use transport::{DEFAULT_BASE_URL, TransportConfig};
