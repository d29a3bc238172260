//! Services that own shared application data

pub mod catalog_client;

pub use catalog_client::CatalogClient;
