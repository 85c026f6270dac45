use metar_report_core::{Error, FeedReport, MetarFeed, RawMetar};
use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use slog::{debug, Logger};
use std::time::Duration;

/// `<response>` envelope returned by the aviationweather.gov METAR endpoint
#[derive(Debug, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub data: FeedData,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedData {
    pub num_results: Option<String>,
    #[serde(rename = "METAR", default)]
    pub metars: Vec<RawMetar>,
}

/// Decodes a feed payload, one or many `<METAR>` elements land in the same list.
pub fn decode_feed(xml: &str) -> Result<FeedReport, Error> {
    if xml.trim().is_empty() {
        return Ok(FeedReport::default());
    }
    let response: FeedResponse = serde_xml_rs::from_str(xml)
        .map_err(|e| Error::FeedUnavailable(format!("error parsing feed response: {}", e)))?;
    let metars = response.data.metars;
    let num_results = response
        .data
        .num_results
        .as_deref()
        .and_then(|n| n.trim().parse::<usize>().ok())
        .unwrap_or(metars.len());
    Ok(FeedReport {
        num_results,
        metars,
    })
}

pub struct HttpFeed {
    logger: Logger,
    url: String,
    client: Client,
}

impl HttpFeed {
    pub fn new(
        logger: Logger,
        url: String,
        user_agent: String,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpFeed {
            logger,
            url,
            client,
        })
    }
}

impl MetarFeed for HttpFeed {
    fn fetch(&self, station_query: &str) -> Result<FeedReport, Error> {
        debug!(self.logger, "requesting: {} ids={}", self.url, station_query);
        let response = self
            .client
            .get(&self.url)
            .query(&[("ids", station_query)])
            .send()
            .map_err(|e| Error::FeedUnavailable(format!("error sending request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(FeedReport::default());
        }
        if !status.is_success() {
            return Err(Error::FeedUnavailable(format!(
                "error response from feed: {}",
                status
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::FeedUnavailable(format!("error reading response body: {}", e)))?;
        decode_feed(&body)
    }
}
