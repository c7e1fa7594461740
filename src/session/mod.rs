pub mod connection;
pub mod factory;
pub mod lifecycle;

pub use factory::MetaApiSessionFactory;

use crate::api::types::AccountRecord;
use crate::api::TradingProvider;
use crate::core::GatewayError;

/// Full per-request session chain: resolve the account, make sure it is
/// deployed, open the channel and wait for synchronization. Sessions are
/// never reused across requests, so every request pays this cost in full.
pub async fn open_trading_session(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<AccountRecord, GatewayError> {
    let account = factory::resolve_account(provider, account_id).await?;
    lifecycle::ensure_deployed(provider, &account).await?;
    connection::establish(provider, &account.id).await?;
    Ok(account)
}
