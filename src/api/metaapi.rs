use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::{sleep, Duration, Instant};

use super::provider::TradingProvider;
use super::types::*;
use crate::core::config::MetaApiConfig;
use crate::core::GatewayError;

const DIRECTORY_PAGE_SIZE: usize = 100;

// Provider-default waits; the gateway exposes no caller override for these.
const DEPLOY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

const TRADE_RETCODE_DONE: i64 = 10009;

/// REST client for the MetaApi provisioning and client APIs, bound to one
/// caller-supplied token. Constructed fresh per inbound request.
#[derive(Debug)]
pub struct MetaApiClient {
    client: Client,
    config: MetaApiConfig,
    token: String,
}

impl MetaApiClient {
    pub fn new(config: MetaApiConfig, token: String) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
        }
    }

    fn provisioning_url(&self, path: &str) -> String {
        format!("{}{}", self.config.provisioning_base_url, path)
    }

    fn client_url(&self, path: &str) -> String {
        format!("{}{}", self.config.client_base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, GatewayError> {
        let mut request = self
            .client
            .request(method, url)
            .header("auth-token", &self.token);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("MetaApi error: {} - {}", status, error_text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication(
                    format!("provider rejected the token (HTTP {})", status.as_u16()),
                ),
                StatusCode::NOT_FOUND => GatewayError::NotFound(error_text),
                _ => GatewayError::ProviderOperation(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    error_text
                )),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        let response = self.send(Method::GET, url, None).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderOperation(format!("unexpected response shape: {}", e)))
    }
}

#[async_trait]
impl TradingProvider for MetaApiClient {
    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, GatewayError> {
        let mut accounts = Vec::new();
        let mut offset = 0;

        // The directory is paginated; flatten it to one list.
        loop {
            let url = self.provisioning_url(&format!(
                "/users/current/accounts?offset={}&limit={}",
                offset, DIRECTORY_PAGE_SIZE
            ));
            let page: Vec<AccountRecord> = self.get_json(&url).await?;
            let fetched = page.len();
            accounts.extend(page);

            if fetched < DIRECTORY_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        tracing::debug!("Directory listing returned {} accounts", accounts.len());
        Ok(accounts)
    }

    async fn get_account(&self, account_id: &str) -> Result<AccountRecord, GatewayError> {
        let url = self.provisioning_url(&format!("/users/current/accounts/{}", account_id));
        self.get_json(&url).await.map_err(|e| match e {
            GatewayError::NotFound(_) => GatewayError::NotFound(account_id.to_string()),
            other => other,
        })
    }

    async fn deploy_account(&self, account_id: &str) -> Result<(), GatewayError> {
        let url = self.provisioning_url(&format!("/users/current/accounts/{}/deploy", account_id));
        self.send(Method::POST, &url, None)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                GatewayError::ProviderOperation(msg) => GatewayError::Provisioning(msg),
                other => other,
            })
    }

    async fn wait_deployed(&self, account_id: &str) -> Result<(), GatewayError> {
        let started = Instant::now();

        loop {
            let account = self.get_account(account_id).await?;
            match account.state {
                DeployState::Deployed => return Ok(()),
                DeployState::Created | DeployState::Deploying => {}
                other => {
                    return Err(GatewayError::Provisioning(format!(
                        "account entered state {:?} while deploying",
                        other
                    )))
                }
            }

            if started.elapsed() >= DEPLOY_TIMEOUT {
                return Err(GatewayError::Provisioning(format!(
                    "account did not deploy within {}s",
                    DEPLOY_TIMEOUT.as_secs()
                )));
            }
            sleep(DEPLOY_POLL_INTERVAL).await;
        }
    }

    async fn wait_connected(&self, account_id: &str) -> Result<(), GatewayError> {
        let started = Instant::now();

        loop {
            let account = self.get_account(account_id).await?;
            if account.connection_status == ConnectionStatus::Connected {
                return Ok(());
            }

            if started.elapsed() >= CONNECT_TIMEOUT {
                return Err(GatewayError::Connection(format!(
                    "terminal did not connect within {}s",
                    CONNECT_TIMEOUT.as_secs()
                )));
            }
            sleep(CONNECT_POLL_INTERVAL).await;
        }
    }

    async fn wait_synchronized(&self, account_id: &str) -> Result<(), GatewayError> {
        // Long poll held open by the provider until the terminal state has
        // replicated; a 408 from the provider means sync did not finish.
        let url = self.client_url(&format!(
            "/users/current/accounts/{}/wait-synchronized",
            account_id
        ));
        match self.send(Method::GET, &url, None).await {
            Ok(_) => Ok(()),
            Err(GatewayError::ProviderOperation(msg)) => Err(GatewayError::Connection(msg)),
            Err(other) => Err(other),
        }
    }

    async fn account_information(
        &self,
        account_id: &str,
    ) -> Result<AccountInformation, GatewayError> {
        let url = self.client_url(&format!(
            "/users/current/accounts/{}/account-information",
            account_id
        ));
        self.get_json(&url).await
    }

    async fn positions(&self, account_id: &str) -> Result<Vec<PositionRecord>, GatewayError> {
        let url = self.client_url(&format!("/users/current/accounts/{}/positions", account_id));
        self.get_json(&url).await
    }

    async fn execute_trade(
        &self,
        account_id: &str,
        request: TradeRequest,
    ) -> Result<TradeResponse, GatewayError> {
        let url = self.client_url(&format!("/users/current/accounts/{}/trade", account_id));
        let body = serde_json::to_value(&request)
            .map_err(|e| GatewayError::ProviderOperation(e.to_string()))?;

        let response = self.send(Method::POST, &url, Some(body)).await?;
        let trade: TradeResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderOperation(format!("unexpected response shape: {}", e)))?;

        // The trade endpoint reports broker rejections in-band.
        if let Some(code) = trade.numeric_code {
            if code != TRADE_RETCODE_DONE {
                let reason = trade
                    .message
                    .clone()
                    .or_else(|| trade.string_code.clone())
                    .unwrap_or_else(|| format!("trade rejected with code {}", code));
                return Err(GatewayError::ProviderOperation(reason));
            }
        }

        Ok(trade)
    }

    async fn deals_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DealRecord>, GatewayError> {
        let url = self.client_url(&format!(
            "/users/current/accounts/{}/history-deals/time/{}/{}",
            account_id,
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        self.get_json(&url).await
    }
}
