use std::collections::{BTreeMap, HashSet};
use std::fmt;

use slog::{debug, info, warn, Logger};
use time::OffsetDateTime;

use crate::{Error, MetarFeed, ObservationRecord, Renderer};

/// The latest observation for each station that the feed could resolve.
pub struct ObservationSet<F: MetarFeed> {
    logger: Logger,
    feed: F,
    stations: Vec<String>,
    resolved: BTreeMap<String, ObservationRecord>,
}

impl<F: MetarFeed> ObservationSet<F> {
    pub fn new<I, S>(stations: I, feed: F, logger: Logger) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stations = normalize_stations(stations);
        if stations.is_empty() {
            return Err(Error::InvalidArgument(String::from(
                "at least one station identifier is required",
            )));
        }
        Ok(ObservationSet {
            logger,
            feed,
            stations,
            resolved: BTreeMap::new(),
        })
    }

    pub fn single(station: &str, feed: F, logger: Logger) -> Result<Self, Error> {
        Self::new([station], feed, logger)
    }

    /// Stations the next `update` will ask for.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn add_stations<I, S>(&mut self, stations: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut combined = std::mem::take(&mut self.stations);
        combined.extend(
            stations
                .into_iter()
                .map(|station| station.as_ref().to_string()),
        );
        self.stations = normalize_stations(combined);
    }

    pub fn get(&self, station_id: &str) -> Option<&ObservationRecord> {
        self.resolved.get(station_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ObservationRecord> {
        self.resolved.values()
    }

    pub fn resolved_ids(&self) -> Vec<&str> {
        self.resolved.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Fetches the latest observations for every station in one request.
    ///
    /// On success the station list narrows to the stations that came back and the resolved
    /// records are replaced by this batch. Any failure leaves the set untouched. Records that
    /// fail to parse are logged and skipped.
    pub fn update(&mut self) -> Result<usize, Error> {
        let query = self.stations.join(" ");
        debug!(self.logger, "requesting observations for: {}", query);

        let report = self.feed.fetch(&query)?;
        if report.is_empty() {
            warn!(self.logger, "feed returned no observations for: {}", query);
            return Err(Error::NoData);
        }

        let mut batch: BTreeMap<String, ObservationRecord> = BTreeMap::new();
        let mut returned: Vec<String> = vec![];
        for raw in report.metars {
            match ObservationRecord::try_from(raw) {
                Ok(record) => {
                    returned.push(record.station_id.clone());
                    batch.insert(record.station_id.clone(), record);
                }
                Err(e) => {
                    warn!(self.logger, "skipping observation: {}", e);
                }
            }
        }
        if batch.is_empty() {
            warn!(self.logger, "no usable observations in feed response");
            return Err(Error::NoData);
        }

        self.resolved.retain(|station_id, _| batch.contains_key(station_id));
        self.resolved.extend(batch);
        self.stations = normalize_stations(returned);

        info!(
            self.logger,
            "resolved {} of {} requested stations",
            self.resolved.len(),
            query.split(' ').count()
        );
        Ok(self.resolved.len())
    }

    pub fn render_all(&self, renderer: &Renderer, now: OffsetDateTime) -> Vec<String> {
        renderer.lines(self.records(), now)
    }
}

impl<F: MetarFeed> fmt::Display for ObservationSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .records()
            .map(|record| format!("{}: {}", record.station_id, record))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Trims, upper-cases and de-duplicates station identifiers, keeping first-seen order.
pub fn normalize_stations<I, S>(stations: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .map(|station| station.as_ref().trim().to_uppercase())
        .filter(|station| !station.is_empty())
        .filter(|station| seen.insert(station.clone()))
        .collect()
}
