//! One-shot account cleanup

use crate::config::Config;
use crate::scheduler::Scheduler;
use crate::state::SharedState;

pub async fn cmd_sweep(config: Config) -> anyhow::Result<()> {
    let scheduler_config = config.scheduler.clone();
    let state = SharedState::new(config).await?;
    let scheduler = Scheduler::new(state.account_service.clone(), scheduler_config);

    let removed = scheduler.run_once().await?;

    println!("✓ Removed {} not activated account(s)", removed);
    Ok(())
}
