use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Reply};

use crate::api::ProviderFactory;
use crate::core::GatewayError;
use crate::trading::{dispatcher, HistoryQuery, OrderIntent, TradeDirection};

// Request bodies. Every field is optional at the serde level so that
// presence can be validated here with a uniform "missing field" envelope
// before anything touches the provider.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsBody {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountScopedBody {
    pub token: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeBody {
    pub token: Option<String>,
    pub account_id: Option<String>,
    pub symbol: Option<String>,
    pub direction: Option<String>,
    pub volume: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionBody {
    pub token: Option<String>,
    pub account_id: Option<String>,
    pub position_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryBody {
    pub token: Option<String>,
    pub account_id: Option<String>,
    pub limit: Option<usize>,
    pub start_time: Option<DateTime<Utc>>,
}

pub async fn health() -> Result<impl Reply, Infallible> {
    Ok(reply::json(&json!({
        "status": "ok",
        "message": "MetaApi trading gateway is running"
    })))
}

pub async fn accounts(
    body: AccountsBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let provider = factory.provider(&token)?;
        let accounts = dispatcher::list_accounts(provider.as_ref()).await?;
        Ok::<_, GatewayError>(json!({ "success": true, "accounts": accounts }))
    }
    .await;
    Ok(respond(result))
}

pub async fn test_connection(
    body: AccountScopedBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let provider = factory.provider(&token)?;
        let check = dispatcher::test_connection(provider.as_ref(), &account_id).await?;
        Ok::<_, GatewayError>(json!({
            "success": true,
            "message": check.message,
            "balance": check.balance,
            "equity": check.equity,
            "currency": check.currency
        }))
    }
    .await;
    Ok(respond(result))
}

pub async fn execute_trade(
    body: ExecuteTradeBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let symbol = require(body.symbol, "symbol")?;
        let direction = TradeDirection::parse(&require(body.direction, "direction")?)?;
        let volume = require(body.volume, "volume")?;

        let provider = factory.provider(&token)?;
        let intent = OrderIntent {
            symbol,
            direction,
            volume,
            stop_loss: body.stop_loss,
            take_profit: body.take_profit,
        };
        let outcome = dispatcher::execute_trade(provider.as_ref(), &account_id, intent).await?;
        Ok::<_, GatewayError>(json!({ "success": true, "result": outcome }))
    }
    .await;
    Ok(respond(result))
}

pub async fn get_positions(
    body: AccountScopedBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let provider = factory.provider(&token)?;
        let positions = dispatcher::get_positions(provider.as_ref(), &account_id).await?;
        Ok::<_, GatewayError>(json!({ "success": true, "positions": positions }))
    }
    .await;
    Ok(respond(result))
}

pub async fn close_position(
    body: ClosePositionBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let position_id = require(body.position_id, "positionId")?;
        let provider = factory.provider(&token)?;
        let outcome =
            dispatcher::close_position(provider.as_ref(), &account_id, &position_id).await?;
        Ok::<_, GatewayError>(json!({ "success": true, "result": outcome }))
    }
    .await;
    Ok(respond(result))
}

pub async fn close_all_positions(
    body: AccountScopedBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let provider = factory.provider(&token)?;
        let outcome = dispatcher::close_all_positions(provider.as_ref(), &account_id).await?;
        Ok::<_, GatewayError>(json!({
            "success": true,
            "message": outcome.message,
            "results": outcome.results
        }))
    }
    .await;
    Ok(respond(result))
}

pub async fn get_history(
    body: HistoryBody,
    factory: Arc<dyn ProviderFactory>,
) -> Result<impl Reply, Infallible> {
    let result = async {
        let token = require(body.token, "token")?;
        let account_id = require(body.account_id, "accountId")?;
        let provider = factory.provider(&token)?;
        let query = HistoryQuery {
            limit: body.limit,
            start_time: body.start_time,
        };
        let deals = dispatcher::get_history(provider.as_ref(), &account_id, query).await?;
        Ok::<_, GatewayError>(json!({ "success": true, "deals": deals }))
    }
    .await;
    Ok(respond(result))
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, GatewayError> {
    field.ok_or_else(|| GatewayError::missing_field(name))
}

fn respond(result: Result<serde_json::Value, GatewayError>) -> reply::WithStatus<reply::Json> {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), StatusCode::OK),
        Err(err) => {
            tracing::error!("Request failed: {}", err);
            reply::with_status(
                reply::json(&json!({ "success": false, "error": err.to_string() })),
                err.http_status(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_the_missing_field_by_name() {
        let err = require(None::<String>, "positionId").unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: positionId");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn require_passes_present_values_through() {
        assert_eq!(require(Some(0.5), "volume").unwrap(), 0.5);
    }
}
