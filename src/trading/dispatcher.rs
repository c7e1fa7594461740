use chrono::Utc;
use uuid::Uuid;

use super::types::*;
use crate::api::types::{TradeActionType, TradeRequest, TradeResponse};
use crate::api::TradingProvider;
use crate::core::GatewayError;
use crate::session;

/// Directory listing only needs the credential, no session chain.
pub async fn list_accounts(
    provider: &dyn TradingProvider,
) -> Result<Vec<AccountSummary>, GatewayError> {
    let accounts = provider.list_accounts().await?;
    Ok(accounts.into_iter().map(AccountSummary::from).collect())
}

pub async fn test_connection(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<ConnectionCheck, GatewayError> {
    session::open_trading_session(provider, account_id).await?;
    let info = provider.account_information(account_id).await?;

    Ok(ConnectionCheck {
        message: "Connection successful".to_string(),
        balance: info.balance,
        equity: info.equity,
        currency: info.currency,
    })
}

pub async fn execute_trade(
    provider: &dyn TradingProvider,
    account_id: &str,
    intent: OrderIntent,
) -> Result<TradeOutcome, GatewayError> {
    let account = session::open_trading_session(provider, account_id).await?;

    tracing::info!(
        "🎯 Placing {:?} market order: {} {} lots on account {}",
        intent.direction,
        intent.symbol,
        intent.volume,
        account.id
    );

    let request = TradeRequest {
        action_type: intent.direction.action_type(),
        symbol: Some(intent.symbol),
        volume: Some(intent.volume),
        position_id: None,
        stop_loss: intent.stop_loss,
        take_profit: intent.take_profit,
        client_id: Uuid::new_v4().to_string(),
    };

    let response = provider.execute_trade(account_id, request).await?;
    tracing::info!("✅ Order placed: {}", response.order_id.as_deref().unwrap_or("-"));

    Ok(TradeOutcome {
        order: response.order_id.unwrap_or_default(),
        position: response.position_id,
        status: "executed".to_string(),
    })
}

pub async fn get_positions(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<Vec<PositionSummary>, GatewayError> {
    session::open_trading_session(provider, account_id).await?;
    let positions = provider.positions(account_id).await?;
    Ok(positions.into_iter().map(PositionSummary::from).collect())
}

pub async fn close_position(
    provider: &dyn TradingProvider,
    account_id: &str,
    position_id: &str,
) -> Result<CloseOutcome, GatewayError> {
    session::open_trading_session(provider, account_id).await?;
    let response = close_one(provider, account_id, position_id).await?;

    tracing::info!("✅ Position {} closed", position_id);
    Ok(CloseOutcome {
        order_id: response.order_id,
        message: format!("Position {} closed", position_id),
    })
}

/// Closes every open position, one after another. A failed close is recorded
/// and the loop moves on; the result list mirrors provider position order.
pub async fn close_all_positions(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<CloseAllOutcome, GatewayError> {
    session::open_trading_session(provider, account_id).await?;
    let positions = provider.positions(account_id).await?;

    let mut results = Vec::with_capacity(positions.len());
    let mut closed = 0usize;

    for position in &positions {
        match close_one(provider, account_id, &position.id).await {
            Ok(response) => {
                closed += 1;
                results.push(PositionCloseResult {
                    position_id: position.id.clone(),
                    success: true,
                    order_id: response.order_id,
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to close position {}: {}", position.id, e);
                results.push(PositionCloseResult {
                    position_id: position.id.clone(),
                    success: false,
                    order_id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    tracing::info!("Closed {} of {} positions", closed, positions.len());
    Ok(CloseAllOutcome {
        message: format!("Closed {} of {} positions", closed, positions.len()),
        results,
    })
}

pub async fn get_history(
    provider: &dyn TradingProvider,
    account_id: &str,
    query: HistoryQuery,
) -> Result<Vec<DealSummary>, GatewayError> {
    session::open_trading_session(provider, account_id).await?;

    let (start, end, limit) = query.resolve(Utc::now());
    let mut deals = provider.deals_in_range(account_id, start, end).await?;

    // Truncated here, not provider-side; provider ordering is preserved.
    deals.truncate(limit);
    Ok(deals.into_iter().map(DealSummary::from).collect())
}

async fn close_one(
    provider: &dyn TradingProvider,
    account_id: &str,
    position_id: &str,
) -> Result<TradeResponse, GatewayError> {
    let request = TradeRequest {
        action_type: TradeActionType::PositionCloseId,
        symbol: None,
        volume: None,
        position_id: Some(position_id.to_string()),
        stop_loss: None,
        take_profit: None,
        client_id: Uuid::new_v4().to_string(),
    };
    provider.execute_trade(account_id, request).await
}
