use metar_report::{get_config_info, setup_logger, HttpFeed};
use metar_report_core::{install_palette, ObservationSet, Palette, Renderer};
use slog::{debug, error, info};
use time::OffsetDateTime;

fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info()?;
    let logger = setup_logger(&cli);

    debug!(logger, "metar report starting");
    debug!(logger, "  Feed URL: {}", cli.feed_url());
    debug!(logger, "  Timeout: {:?}", cli.timeout());

    if let Some(colors) = cli.colors.as_ref() {
        install_palette(Palette::from_config(colors)?);
    }

    let feed = HttpFeed::new(
        logger.clone(),
        cli.feed_url(),
        cli.user_agent(),
        cli.timeout(),
    )?;
    let mut observations = ObservationSet::new(&cli.stations, feed, logger.clone())?;

    if let Err(err) = observations.update() {
        error!(logger, "Error updating observations: {}", err);
        return Err(err.into());
    }
    info!(
        logger,
        "reporting {} stations: {}",
        observations.len(),
        observations.stations().join(" ")
    );

    let renderer = Renderer::new(!cli.no_color);
    println!(
        "{}",
        renderer.report(observations.records(), OffsetDateTime::now_utc())
    );
    Ok(())
}
