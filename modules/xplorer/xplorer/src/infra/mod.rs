pub mod api_client;
pub mod dto;
pub mod file_cache;

pub use api_client::HttpNetworkApi;
pub use file_cache::FileGeoCache;
