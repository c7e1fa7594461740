use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::types::{
    AccountInformation, AccountRecord, DealRecord, PositionRecord, TradeRequest, TradeResponse,
};
use crate::core::GatewayError;

/// Everything the gateway asks of the brokerage-connectivity provider.
///
/// The production implementation is [`MetaApiClient`](super::MetaApiClient);
/// tests substitute recording stubs or mocks behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingProvider: std::fmt::Debug + Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, GatewayError>;

    async fn get_account(&self, account_id: &str) -> Result<AccountRecord, GatewayError>;

    async fn deploy_account(&self, account_id: &str) -> Result<(), GatewayError>;

    /// Blocks until the provider reports the account DEPLOYED.
    async fn wait_deployed(&self, account_id: &str) -> Result<(), GatewayError>;

    /// Blocks until the terminal link for the account is up.
    async fn wait_connected(&self, account_id: &str) -> Result<(), GatewayError>;

    /// Blocks until initial state synchronization has finished.
    async fn wait_synchronized(&self, account_id: &str) -> Result<(), GatewayError>;

    async fn account_information(
        &self,
        account_id: &str,
    ) -> Result<AccountInformation, GatewayError>;

    async fn positions(&self, account_id: &str) -> Result<Vec<PositionRecord>, GatewayError>;

    async fn execute_trade(
        &self,
        account_id: &str,
        request: TradeRequest,
    ) -> Result<TradeResponse, GatewayError>;

    async fn deals_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, GatewayError>;
}

/// Builds a provider client for one request. The gateway keeps no session
/// alive between requests, so every request goes through here.
pub trait ProviderFactory: Send + Sync {
    fn provider(&self, token: &str) -> Result<Arc<dyn TradingProvider>, GatewayError>;
}
