use thiserror::Error;
use warp::http::StatusCode;

/// Every failure the gateway can report, keyed by where in the request
/// chain it happened. Callers see only the display message; the kind picks
/// the HTTP status.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("account not found: {0}")]
    NotFound(String),

    #[error("deployment failed: {0}")]
    Provisioning(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("provider request failed: {0}")]
    ProviderOperation(String),
}

impl GatewayError {
    pub fn missing_field(name: &str) -> Self {
        GatewayError::Validation(format!("Missing required field: {}", name))
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            GatewayError::missing_field("token").http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn provider_failures_map_to_500() {
        for err in [
            GatewayError::Authentication("bad token".into()),
            GatewayError::NotFound("abc".into()),
            GatewayError::Provisioning("timed out".into()),
            GatewayError::Connection("sync timed out".into()),
            GatewayError::ProviderOperation("HTTP 502".into()),
        ] {
            assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn missing_field_message_names_the_field() {
        let err = GatewayError::missing_field("accountId");
        assert_eq!(err.to_string(), "Missing required field: accountId");
    }
}
