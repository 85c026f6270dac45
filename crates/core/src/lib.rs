//! METAR report core library
//!
//! - Observation model: wind, sky layers, derived humidity, ceiling and age
//! - Station set with the batch update against a [`MetarFeed`]
//! - Fixed-width, severity colored report rendering
//! - Configuration file discovery

mod category;
mod config;
mod error;
mod feed;
mod observation;
mod observation_set;
mod render;
mod sky;
mod wind;

pub use category::{AgeBucket, FlightCategory};
pub use config::{find_config_file, load_config, ConfigSource};
pub use error::Error;
pub use feed::{FeedReport, MetarFeed};
pub use observation::{relative_humidity, ObservationRecord, RawMetar, RawSkyCondition};
pub use observation_set::{normalize_stations, ObservationSet};
pub use render::{format_visibility, install_palette, palette, Palette, PaletteConfig, Renderer};
pub use sky::{CloudLayer, Coverage, SkyState};
pub use wind::Wind;

/// Application name used for config paths
pub const APP_NAME: &str = "metar-report";

/// Default METAR endpoint, stations are appended as the `ids` query parameter
pub const DEFAULT_FEED_URL: &str = "https://aviationweather.gov/api/data/metar?format=xml";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
