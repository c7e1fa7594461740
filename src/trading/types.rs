use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::types::{
    AccountRecord, ConnectionStatus, DealRecord, DeployState, PositionRecord, PositionSide,
    TradeActionType,
};
use crate::core::GatewayError;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 30;

/// Caller-facing account projection. Exactly this field set goes over the
/// wire; anything else the provider reports stays behind the boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub login: String,
    pub server: String,
    pub region: Option<String>,
    pub state: DeployState,
    pub connection_status: ConnectionStatus,
    pub magic: i64,
}

impl From<AccountRecord> for AccountSummary {
    fn from(account: AccountRecord) -> Self {
        Self {
            id: account.id,
            name: account.name,
            account_type: account.account_type,
            login: account.login,
            server: account.server,
            region: account.region,
            state: account.state,
            connection_status: account.connection_status,
            magic: account.magic,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: PositionSide,
    pub volume: f64,
    pub open_price: f64,
    pub current_price: f64,
    pub profit: f64,
    pub time: DateTime<Utc>,
}

impl From<PositionRecord> for PositionSummary {
    fn from(position: PositionRecord) -> Self {
        Self {
            id: position.id,
            symbol: position.symbol,
            side: position.side,
            volume: position.volume,
            open_price: position.open_price,
            current_price: position.current_price,
            profit: position.profit,
            time: position.time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub deal_type: String,
    pub symbol: Option<String>,
    pub volume: Option<f64>,
    pub price: Option<f64>,
    pub profit: f64,
    pub time: DateTime<Utc>,
}

impl From<DealRecord> for DealSummary {
    fn from(deal: DealRecord) -> Self {
        Self {
            id: deal.id,
            deal_type: deal.deal_type,
            symbol: deal.symbol,
            volume: deal.volume,
            price: deal.price,
            profit: deal.profit,
            time: deal.time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// Case-insensitive; anything other than BUY/SELL never reaches the
    /// provider.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        match raw.to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeDirection::Buy),
            "SELL" => Ok(TradeDirection::Sell),
            _ => Err(GatewayError::Validation(format!(
                "Invalid direction '{}': must be BUY or SELL",
                raw
            ))),
        }
    }

    pub fn action_type(self) -> TradeActionType {
        match self {
            TradeDirection::Buy => TradeActionType::MarketBuy,
            TradeDirection::Sell => TradeActionType::MarketSell,
        }
    }
}

/// Market order as validated at the gateway edge. Presence only; numeric
/// sanity (negative volume etc.) is the broker's call.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub symbol: String,
    pub direction: TradeDirection,
    pub volume: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub start_time: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    /// Resolved window and limit: [now − 30 days, now] and 20 deals unless
    /// the caller said otherwise.
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>, usize) {
        let start = self
            .start_time
            .unwrap_or(now - Duration::days(DEFAULT_HISTORY_WINDOW_DAYS));
        (start, now, self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCheck {
    pub message: String,
    pub balance: f64,
    pub equity: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcome {
    pub order: String,
    pub position: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseOutcome {
    pub order_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCloseResult {
    pub position_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAllOutcome {
    pub message: String,
    pub results: Vec<PositionCloseResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parsing_is_case_insensitive() {
        assert_eq!(TradeDirection::parse("buy").unwrap(), TradeDirection::Buy);
        assert_eq!(TradeDirection::parse("BUY").unwrap(), TradeDirection::Buy);
        assert_eq!(TradeDirection::parse("Sell").unwrap(), TradeDirection::Sell);
        assert_eq!(TradeDirection::parse("sELL").unwrap(), TradeDirection::Sell);
    }

    #[test]
    fn unknown_direction_is_a_validation_error() {
        let err = TradeDirection::parse("hold").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(err.to_string().contains("hold"));
    }

    #[test]
    fn account_summary_exposes_exactly_the_documented_fields() {
        let summary = AccountSummary {
            id: "acc-1".to_string(),
            name: "Demo".to_string(),
            account_type: "cloud-g2".to_string(),
            login: "51335712".to_string(),
            server: "ICMarketsSC-Demo".to_string(),
            region: Some("london".to_string()),
            state: DeployState::Deployed,
            connection_status: ConnectionStatus::Connected,
            magic: 7,
        };

        let value = serde_json::to_value(&summary).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "connectionStatus",
                "id",
                "login",
                "magic",
                "name",
                "region",
                "server",
                "state",
                "type"
            ]
        );
    }

    #[test]
    fn history_query_defaults_to_a_30_day_window_and_20_deals() {
        let now = Utc::now();
        let (start, end, limit) = HistoryQuery::default().resolve(now);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(30));
        assert_eq!(limit, 20);
    }

    #[test]
    fn history_query_keeps_explicit_values() {
        let now = Utc::now();
        let explicit_start = now - Duration::days(3);
        let query = HistoryQuery {
            limit: Some(5),
            start_time: Some(explicit_start),
        };

        let (start, end, limit) = query.resolve(now);
        assert_eq!(start, explicit_start);
        assert_eq!(end, now);
        assert_eq!(limit, 5);
    }
}
