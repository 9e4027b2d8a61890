use anyhow::Result;

/// Serve only the liveness endpoint until Ctrl+C
pub fn execute(port: u16) -> Result<()> {
    tracing::info!("Starting health endpoint on port {}", port);
    super::runtime()?.block_on(scorewatch_bot::run_health(port))?;
    Ok(())
}
