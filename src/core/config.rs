use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub metaapi: MetaApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaApiConfig {
    pub provisioning_base_url: String,
    pub client_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            metaapi: MetaApiConfig {
                provisioning_base_url: env::var("METAAPI_PROVISIONING_URL").unwrap_or_else(
                    |_| "https://mt-provisioning-api-v1.agiliumtrade.agiliumtrade.ai".to_string(),
                ),
                client_base_url: env::var("METAAPI_CLIENT_URL").unwrap_or_else(|_| {
                    "https://mt-client-api-v1.agiliumtrade.agiliumtrade.ai".to_string()
                }),
            },
        })
    }
}
