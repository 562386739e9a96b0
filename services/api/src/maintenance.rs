//! Periodic maintenance jobs

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::repositories::UserRepository;

/// Sweep every five minutes unless configured otherwise.
const DEFAULT_SCHEDULE: &str = "0 */5 * * * *";

/// Start the scheduler that clears expired password-reset codes, so a
/// stale code disappears even if nobody ever presents it again.
///
/// The returned scheduler stops when dropped; the caller keeps it alive.
pub async fn start_reset_code_sweeper(users: UserRepository) -> Result<JobScheduler> {
    let schedule = std::env::var("RESET_CODE_SWEEP_SCHEDULE")
        .unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string());

    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule.as_str(), move |_id, _scheduler| {
        let users = users.clone();
        Box::pin(async move {
            match users.clear_expired_reset_codes().await {
                Ok(0) => {}
                Ok(cleared) => info!("Cleared {} expired reset codes", cleared),
                Err(e) => error!("Failed to clear expired reset codes: {}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("Reset-code sweeper scheduled ({})", schedule);

    Ok(scheduler)
}
