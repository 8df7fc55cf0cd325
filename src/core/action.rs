use crate::core::CloudApi;
use crate::domain::model::{Action, ServiceUpdate};
use crate::utils::error::{ApiError, ApiResult, PhaseFailure};
use std::time::Duration;
use tokio::time::Instant;

/// Polls `action` until it leaves the running state or `timeout` elapses.
pub async fn wait_for_action<A: CloudApi + ?Sized>(
    api: &A,
    mut action: Action,
    poll_interval: Duration,
    timeout: Duration,
) -> ApiResult<Action> {
    let started = Instant::now();

    while action.is_running() {
        if started.elapsed() >= timeout {
            return Err(ApiError::ActionTimeout {
                id: action.id,
                waited: started.elapsed(),
            });
        }
        tokio::time::sleep(poll_interval).await;
        action = api.get_action(action.id).await?;
        tracing::debug!(
            action_id = action.id,
            status = %action.status,
            progress = action.progress,
            "Polled action"
        );
    }

    Ok(action)
}

/// Submits a full certificate-list replacement and blocks until it applied.
pub async fn apply_service_update<A: CloudApi + ?Sized>(
    api: &A,
    load_balancer_id: i64,
    update: &ServiceUpdate,
    poll_interval: Duration,
    timeout: Duration,
) -> std::result::Result<Action, PhaseFailure> {
    let submitted = api.update_service(load_balancer_id, update).await?;
    let finished = wait_for_action(api, submitted, poll_interval, timeout).await?;

    if finished.is_complete() {
        Ok(finished)
    } else {
        Err(PhaseFailure::Action(finished))
    }
}
