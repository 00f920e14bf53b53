//! Shopify Admin API adapter

pub mod client;
pub mod models;

pub use client::ShopifyClient;
pub use models::ShopIdentity;
