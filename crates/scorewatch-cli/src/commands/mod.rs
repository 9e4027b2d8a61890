pub mod bot;
pub mod completion;
pub mod health;
pub mod scrape;

/// Multi-threaded runtime for the async commands
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
