use crate::api::TradingProvider;
use crate::core::GatewayError;

/// Opens the session channel for an account and blocks until the provider
/// reports initial state synchronization finished. Runs after the lifecycle
/// guard; the channel is per-request and reclaimed by the provider.
pub async fn establish(
    provider: &dyn TradingProvider,
    account_id: &str,
) -> Result<(), GatewayError> {
    provider.wait_connected(account_id).await?;
    provider.wait_synchronized(account_id).await?;
    tracing::debug!("Account {} connected and synchronized", account_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::provider::MockTradingProvider;
    use mockall::Sequence;

    #[tokio::test]
    async fn connects_before_waiting_for_sync() {
        let mut provider = MockTradingProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_wait_connected()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        provider
            .expect_wait_synchronized()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        establish(&provider, "acc-1").await.unwrap();
    }

    #[tokio::test]
    async fn connect_failure_skips_the_sync_wait() {
        let mut provider = MockTradingProvider::new();
        provider
            .expect_wait_connected()
            .times(1)
            .returning(|_| Err(GatewayError::Connection("terminal offline".to_string())));
        provider.expect_wait_synchronized().times(0);

        let err = establish(&provider, "acc-1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Connection(_)));
    }
}
