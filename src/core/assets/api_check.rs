//! API reachability and store identity check

use super::{Asset, AssetKey, Materialization};
use crate::adapters::shopify::{ShopIdentity, ShopifyClient};
use crate::core::pipeline::RunContext;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;

/// Authenticated `shop.json` check, optionally pinned to a store name
pub struct ApiCheck;

#[async_trait]
impl Asset for ApiCheck {
    fn key(&self) -> AssetKey {
        AssetKey::ApiCheck
    }

    fn deps(&self) -> &[AssetKey] {
        &[]
    }

    async fn materialize(&self, ctx: &RunContext) -> Result<Materialization> {
        let shopify = &ctx.config.shopify;
        let client = ShopifyClient::new(shopify)?;
        let shop = client.current_shop().await?;

        verify_identity(&shop, shopify.expected_store_name.as_deref())?;

        tracing::info!(
            shop_id = shop.id,
            shop_name = %shop.name,
            base_url = client.base_url(),
            "Shopify API reachable"
        );

        let mut m = Materialization::new(format!("Connected to '{}'", shop.name))
            .with_metadata("shop_id", shop.id)
            .with_metadata("shop_name", &shop.name);
        if let Some(domain) = &shop.myshopify_domain {
            m = m.with_metadata("myshopify_domain", domain);
        }
        Ok(m)
    }
}

/// Compare the store name against the expected one, if any
pub fn verify_identity(shop: &ShopIdentity, expected: Option<&str>) -> Result<()> {
    match expected {
        Some(expected) if shop.name != expected => Err(PipelineError::IdentityMismatch {
            expected: expected.to_string(),
            actual: shop.name.clone(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(name: &str) -> ShopIdentity {
        ShopIdentity {
            id: 1,
            name: name.to_string(),
            domain: None,
            myshopify_domain: None,
        }
    }

    #[test]
    fn test_verify_identity_match() {
        assert!(verify_identity(&shop("No Name Business 123"), Some("No Name Business 123")).is_ok());
    }

    #[test]
    fn test_verify_identity_mismatch() {
        let err = verify_identity(&shop("Other Store"), Some("No Name Business 123")).unwrap_err();
        match err {
            PipelineError::IdentityMismatch { expected, actual } => {
                assert_eq!(expected, "No Name Business 123");
                assert_eq!(actual, "Other Store");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_identity_is_case_sensitive() {
        assert!(verify_identity(&shop("no name business 123"), Some("No Name Business 123")).is_err());
    }

    #[test]
    fn test_verify_identity_without_expectation() {
        assert!(verify_identity(&shop("Anything"), None).is_ok());
    }
}
