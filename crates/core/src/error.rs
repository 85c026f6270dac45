#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Weather feed unavailable: {0}")]
    FeedUnavailable(String),
    #[error("Weather feed returned no usable observations")]
    NoData,
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to load config: {0}")]
    Config(String),
}

impl Error {
    /// Prefixes an `InvalidObservation` message with the station it came from.
    pub fn for_station(self, station_id: &str) -> Self {
        match self {
            Error::InvalidObservation(reason) => {
                Error::InvalidObservation(format!("{}: {}", station_id, reason))
            }
            other => other,
        }
    }
}
