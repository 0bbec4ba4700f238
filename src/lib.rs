pub mod collection;
pub mod config;
pub mod eden;
pub mod error;
pub mod metrics;
pub mod server;
pub mod store;

pub use collection::{fetch_collection, Collection};
pub use config::Config;
pub use error::Error;
pub use metrics::Metrics;
