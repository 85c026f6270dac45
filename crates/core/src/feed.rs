use crate::{Error, RawMetar};

/// What a feed hands back for one request.
#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    pub num_results: usize,
    pub metars: Vec<RawMetar>,
}

impl FeedReport {
    pub fn new(metars: Vec<RawMetar>) -> Self {
        FeedReport {
            num_results: metars.len(),
            metars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_results == 0 || self.metars.is_empty()
    }
}

/// Source of raw METARs, queried with space separated station identifiers.
pub trait MetarFeed {
    fn fetch(&self, station_query: &str) -> Result<FeedReport, Error>;
}

impl<F: MetarFeed + ?Sized> MetarFeed for Box<F> {
    fn fetch(&self, station_query: &str) -> Result<FeedReport, Error> {
        (**self).fetch(station_query)
    }
}
