use nowplaying::{
    auth::{authorize, Prompt},
    config::SPOTIFY_TOKEN_URL,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    simple_env_load::load_env_from([".dev.env", ".env"]);
    alto_logger::TermLogger::new(
        alto_logger::Options::default()
            .with_time(alto_logger::TimeConfig::relative_now())
            .with_style(alto_logger::StyleConfig::MultiLine),
    )?
    .init()?;

    let stdin = std::io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), std::io::stdout());

    let token = match authorize(&mut prompt, std::env::var(SPOTIFY_TOKEN_URL).ok()).await {
        Ok(token) => token,
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(1)
        }
    };

    println!("Refresh Token: {}", &*token);
    Ok(())
}
