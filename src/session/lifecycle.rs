use crate::api::types::{AccountRecord, DeployState};
use crate::api::TradingProvider;
use crate::core::GatewayError;

/// Makes sure the account is deployed before a session is opened.
///
/// Idempotent: an account already in DEPLOYED produces zero provider calls.
/// Anything else triggers deployment and blocks until the provider confirms
/// it, with the provider-default timeout. Failures surface as-is; the
/// gateway never retries provisioning.
pub async fn ensure_deployed(
    provider: &dyn TradingProvider,
    account: &AccountRecord,
) -> Result<(), GatewayError> {
    if account.state == DeployState::Deployed {
        tracing::debug!("Account {} already deployed", account.id);
        return Ok(());
    }

    tracing::info!(
        "Deploying account {} (current state {:?})",
        account.id,
        account.state
    );
    provider.deploy_account(&account.id).await?;
    provider.wait_deployed(&account.id).await?;
    tracing::info!("✅ Account {} deployed", account.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::provider::MockTradingProvider;
    use crate::api::types::ConnectionStatus;
    use mockall::Sequence;

    fn account_in_state(state: DeployState) -> AccountRecord {
        AccountRecord {
            id: "acc-1".to_string(),
            name: "Demo".to_string(),
            account_type: "cloud-g2".to_string(),
            login: "51335712".to_string(),
            server: "ICMarketsSC-Demo".to_string(),
            region: Some("london".to_string()),
            state,
            connection_status: ConnectionStatus::Disconnected,
            magic: 0,
        }
    }

    #[tokio::test]
    async fn deployed_account_issues_no_provider_calls() {
        let mut provider = MockTradingProvider::new();
        provider.expect_deploy_account().times(0);
        provider.expect_wait_deployed().times(0);

        let account = account_in_state(DeployState::Deployed);
        ensure_deployed(&provider, &account).await.unwrap();
    }

    #[tokio::test]
    async fn undeployed_account_deploys_then_waits() {
        let mut provider = MockTradingProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_deploy_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        provider
            .expect_wait_deployed()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let account = account_in_state(DeployState::Undeployed);
        ensure_deployed(&provider, &account).await.unwrap();
    }

    #[tokio::test]
    async fn deploy_failure_surfaces_without_waiting() {
        let mut provider = MockTradingProvider::new();
        provider
            .expect_deploy_account()
            .times(1)
            .returning(|_| Err(GatewayError::Provisioning("quota exceeded".to_string())));
        provider.expect_wait_deployed().times(0);

        let account = account_in_state(DeployState::Created);
        let err = ensure_deployed(&provider, &account).await.unwrap_err();
        assert!(matches!(err, GatewayError::Provisioning(_)));
    }
}
