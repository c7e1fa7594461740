pub mod metaapi;
pub mod provider;
pub mod types;

pub use metaapi::MetaApiClient;
pub use provider::{ProviderFactory, TradingProvider};
pub use types::*;
