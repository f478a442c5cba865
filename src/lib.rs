pub mod config;
pub mod ddragon_fetch;
pub mod error;
pub mod fetch;
pub mod format;
pub mod http_client;
pub mod locale;
pub mod media;
pub mod persist;
pub mod pipeline;
pub mod provider;
pub mod state;
