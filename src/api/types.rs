use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state the provisioning directory reports for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployState {
    Created,
    Deploying,
    Deployed,
    Undeploying,
    Undeployed,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    DisconnectedFromBroker,
}

/// Account entry as returned by the provisioning directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub login: String,
    pub server: String,
    #[serde(default)]
    pub region: Option<String>,
    pub state: DeployState,
    pub connection_status: ConnectionStatus,
    #[serde(default)]
    pub magic: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInformation {
    pub balance: f64,
    pub equity: f64,
    pub currency: String,
    #[serde(default)]
    pub margin: f64,
    #[serde(default)]
    pub free_margin: f64,
    #[serde(default)]
    pub leverage: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    #[serde(rename = "POSITION_TYPE_BUY")]
    Buy,
    #[serde(rename = "POSITION_TYPE_SELL")]
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub side: PositionSide,
    pub symbol: String,
    pub volume: f64,
    pub open_price: f64,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub swap: f64,
    #[serde(default)]
    pub commission: f64,
    pub time: DateTime<Utc>,
}

/// Historical deal. The deal-type vocabulary is open-ended on the provider
/// side (balance operations, credits, buy/sell fills), so it stays a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub deal_type: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub swap: f64,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub position_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeActionType {
    #[serde(rename = "ORDER_TYPE_BUY")]
    MarketBuy,
    #[serde(rename = "ORDER_TYPE_SELL")]
    MarketSell,
    #[serde(rename = "POSITION_CLOSE_ID")]
    PositionCloseId,
}

/// Body of the client-api `/trade` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub action_type: TradeActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    #[serde(default)]
    pub numeric_code: Option<i64>,
    #[serde(default)]
    pub string_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub position_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_record_decodes_provisioning_shape() {
        let raw = r#"{
            "_id": "865d3a4d-3803-486d-bdf3-a85679d9fad2",
            "name": "Demo account",
            "type": "cloud-g2",
            "login": "51335712",
            "server": "ICMarketsSC-Demo",
            "region": "london",
            "state": "DEPLOYED",
            "connectionStatus": "CONNECTED",
            "magic": 123456,
            "application": "MetaApi",
            "reliability": "regular"
        }"#;

        let account: AccountRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(account.id, "865d3a4d-3803-486d-bdf3-a85679d9fad2");
        assert_eq!(account.state, DeployState::Deployed);
        assert_eq!(account.connection_status, ConnectionStatus::Connected);
        assert_eq!(account.magic, 123456);
    }

    #[test]
    fn position_record_decodes_with_typed_side() {
        let raw = r#"{
            "id": "46214692",
            "type": "POSITION_TYPE_SELL",
            "symbol": "GBPUSD",
            "volume": 0.07,
            "openPrice": 1.26101,
            "currentPrice": 1.24883,
            "profit": 85.26,
            "time": "2024-04-15T02:45:06.521Z"
        }"#;

        let position: PositionRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(position.side, PositionSide::Sell);
        assert_eq!(position.symbol, "GBPUSD");
        assert_eq!(position.swap, 0.0);
    }

    #[test]
    fn trade_request_serializes_wire_action_type() {
        let request = TradeRequest {
            action_type: TradeActionType::MarketBuy,
            symbol: Some("EURUSD".to_string()),
            volume: Some(0.1),
            position_id: None,
            stop_loss: None,
            take_profit: Some(1.1),
            client_id: "TE_EURUSD_1".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["actionType"], "ORDER_TYPE_BUY");
        assert_eq!(value["takeProfit"], 1.1);
        assert!(value.get("stopLoss").is_none());
        assert!(value.get("positionId").is_none());
    }
}
