use std::sync::Arc;

use crate::api::types::AccountRecord;
use crate::api::{MetaApiClient, ProviderFactory, TradingProvider};
use crate::core::config::MetaApiConfig;
use crate::core::GatewayError;

/// Builds a MetaApi client bound to the caller's token, one per request.
pub struct MetaApiSessionFactory {
    config: MetaApiConfig,
}

impl MetaApiSessionFactory {
    pub fn new(config: MetaApiConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for MetaApiSessionFactory {
    fn provider(&self, token: &str) -> Result<Arc<dyn TradingProvider>, GatewayError> {
        if token.trim().is_empty() {
            return Err(GatewayError::Authentication(
                "token must not be empty".to_string(),
            ));
        }
        Ok(Arc::new(MetaApiClient::new(
            self.config.clone(),
            token.to_string(),
        )))
    }
}

/// Resolves an account id through the provider directory.
pub async fn resolve_account(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<AccountRecord, GatewayError> {
    let account = provider.get_account(account_id).await?;
    tracing::debug!("Resolved account {} ({})", account.id, account.name);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MetaApiConfig {
        MetaApiConfig {
            provisioning_base_url: "http://localhost:1".to_string(),
            client_base_url: "http://localhost:1".to_string(),
        }
    }

    #[test]
    fn empty_token_is_an_authentication_error() {
        let factory = MetaApiSessionFactory::new(test_config());

        let err = factory.provider("").unwrap_err();
        assert!(matches!(err, GatewayError::Authentication(_)));

        let err = factory.provider("   ").unwrap_err();
        assert!(matches!(err, GatewayError::Authentication(_)));
    }

    #[test]
    fn non_empty_token_builds_a_provider() {
        let factory = MetaApiSessionFactory::new(test_config());
        assert!(factory.provider("metaapi-token").is_ok());
    }
}
