use nowplaying::{Config, Poller};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    simple_env_load::load_env_from([".dev.env", ".env"]);
    alto_logger::TermLogger::new(
        alto_logger::Options::default()
            .with_time(alto_logger::TimeConfig::relative_now())
            .with_style(alto_logger::StyleConfig::MultiLine),
    )?
    .init()?;

    let config = Config::load_from_env()?;
    log::debug!("{config:?}");

    log::info!(
        "polling every {} and sending to {}",
        humantime::format_duration(config.polling.interval),
        config.ntfy.url
    );

    Poller::new(&config).run().await
}
