use std::fmt;

use serde::Deserialize;
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};

use crate::{AgeBucket, CloudLayer, Error, FlightCategory, SkyState, Wind};

/// One METAR as handed over by the feed: every field is raw text and any of them may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetar {
    pub raw_text: Option<String>,
    pub station_id: Option<String>,
    pub observation_time: Option<String>,
    pub temp_c: Option<String>,
    pub dewpoint_c: Option<String>,
    pub wind_dir_degrees: Option<String>,
    pub wind_speed_kt: Option<String>,
    pub wind_gust_kt: Option<String>,
    pub visibility_statute_mi: Option<String>,
    pub altim_in_hg: Option<String>,
    pub wx_string: Option<String>,
    #[serde(default)]
    pub sky_condition: Vec<RawSkyCondition>,
    pub flight_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSkyCondition {
    pub sky_cover: String,
    pub cloud_base_ft_agl: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub station_id: String,
    pub observed_at: OffsetDateTime,
    /// Report time as printed, `DDHHMM` without the trailing zone marker.
    pub report_time: String,
    pub raw_text: String,
    pub temp_c: Option<i32>,
    pub dewpoint_c: Option<i32>,
    pub relative_humidity_pct: Option<i32>,
    pub wind: Option<Wind>,
    pub visibility_mi: Option<f64>,
    pub altimeter_inhg: Option<f64>,
    pub flight_category: Option<FlightCategory>,
    pub sky: Option<SkyState>,
    pub weather_phenomena: String,
}

impl TryFrom<RawMetar> for ObservationRecord {
    type Error = Error;

    fn try_from(mut val: RawMetar) -> Result<Self, Self::Error> {
        let station_id = non_empty(val.station_id.take())
            .ok_or_else(|| Error::InvalidObservation(String::from("missing station_id")))?;
        parse_record(station_id.clone(), val).map_err(|e| e.for_station(&station_id))
    }
}

fn parse_record(station_id: String, val: RawMetar) -> Result<ObservationRecord, Error> {
    let observation_time = non_empty(val.observation_time)
        .ok_or_else(|| Error::InvalidObservation(String::from("missing observation_time")))?;
    let observed_at = parse_observation_time(&observation_time)?;
    let raw_text = non_empty(val.raw_text)
        .ok_or_else(|| Error::InvalidObservation(String::from("missing raw_text")))?;
    let report_time = report_time_token(&raw_text).unwrap_or_else(|| {
        format!(
            "{:02}{:02}{:02}",
            observed_at.day(),
            observed_at.hour(),
            observed_at.minute()
        )
    });

    let temp_c = parse_float(val.temp_c).and_then(round_to_i32);
    let dewpoint_c = parse_float(val.dewpoint_c).and_then(round_to_i32);
    let relative_humidity_pct = match (temp_c, dewpoint_c) {
        (Some(temp), Some(dewpoint)) => relative_humidity(temp, dewpoint),
        _ => None,
    };

    let wind = parse_wind(val.wind_dir_degrees, val.wind_speed_kt, val.wind_gust_kt)?;

    let layers = val
        .sky_condition
        .iter()
        .map(|sky| CloudLayer::new(&sky.sky_cover, sky.cloud_base_ft_agl.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let flight_category = non_empty(val.flight_category)
        .map(|cat| cat.parse::<FlightCategory>())
        .transpose()?;

    Ok(ObservationRecord {
        station_id,
        observed_at,
        report_time,
        raw_text,
        temp_c,
        dewpoint_c,
        relative_humidity_pct,
        wind,
        visibility_mi: parse_visibility(val.visibility_statute_mi),
        altimeter_inhg: parse_float(val.altim_in_hg).map(truncate_hundredths),
        flight_category,
        sky: SkyState::new(layers),
        weather_phenomena: val.wx_string.unwrap_or_default().trim().to_string(),
    })
}

impl ObservationRecord {
    /// Whole minutes elapsed since the observation, read against `now`.
    pub fn age_minutes(&self, now: OffsetDateTime) -> i64 {
        (now - self.observed_at).whole_seconds().div_euclid(60)
    }

    pub fn age_bucket(&self, now: OffsetDateTime) -> AgeBucket {
        AgeBucket::from_minutes(self.age_minutes(now))
    }

    pub fn ceiling_ft(&self) -> Option<u32> {
        self.sky
            .as_ref()
            .and_then(|sky| sky.ceiling())
            .and_then(|layer| layer.altitude_agl_ft)
    }

    /// `15/10`, `M05/M12`, with `--` standing in for a missing value.
    pub fn temp_and_dewpoint(&self) -> String {
        format!(
            "{}/{}",
            format_temperature(self.temp_c),
            format_temperature(self.dewpoint_c)
        )
    }
}

impl fmt::Display for ObservationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.station_id,
            self.flight_category
                .map(|cat| cat.as_str())
                .unwrap_or("--"),
            self.wind
                .map(|wind| wind.render())
                .unwrap_or_else(|| String::from("--")),
            self.altimeter_inhg
                .map(|altim| format!("{:.2}", altim))
                .unwrap_or_else(|| String::from("--")),
            self.temp_and_dewpoint(),
            self.visibility_mi
                .map(|vis| vis.to_string())
                .unwrap_or_else(|| String::from("--")),
            self.sky
                .as_ref()
                .map(|sky| sky.all_layers())
                .unwrap_or_else(|| String::from("--")),
        )
    }
}

/// Magnus approximation of relative humidity, rounded to a whole percent.
///
/// Returns `None` when the inputs sit on the singularity of the approximation.
pub fn relative_humidity(temp_c: i32, dewpoint_c: i32) -> Option<i32> {
    let magnus = |t: f64| (17.625 * t / (243.04 + t)).exp();
    let rh = 100.0 * magnus(f64::from(dewpoint_c)) / magnus(f64::from(temp_c));
    round_to_i32(rh)
}

fn round_to_i32(value: f64) -> Option<i32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Some(rounded as i32)
    } else {
        None
    }
}

fn format_temperature(value: Option<i32>) -> String {
    match value {
        Some(t) if t < 0 => format!("M{:02}", t.abs()),
        Some(t) => format!("{:02}", t),
        None => String::from("--"),
    }
}

// cut at the hundredths; the epsilon absorbs binary representation error such as 30.01 * 100
fn truncate_hundredths(value: f64) -> f64 {
    ((value * 100.0) + 1e-6).trunc() / 100.0
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_float(value: Option<String>) -> Option<f64> {
    non_empty(value)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// out-of-range values stay i64::MAX/MIN and are rejected downstream
fn parse_integer(value: Option<String>) -> Option<i64> {
    parse_float(value).map(|v| v.round() as i64)
}

fn parse_visibility(value: Option<String>) -> Option<f64> {
    // the feed reports unlimited visibility as "10+"
    non_empty(value)
        .and_then(|v| v.trim_end_matches('+').parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_wind(
    direction: Option<String>,
    speed: Option<String>,
    gust: Option<String>,
) -> Result<Option<Wind>, Error> {
    let Some(speed) = parse_integer(speed) else {
        return Ok(None);
    };
    let direction = match non_empty(direction) {
        Some(dir) if dir == "VRB" => 0,
        Some(dir) => dir.parse::<i64>().map_err(|e| {
            Error::InvalidObservation(format!("wind direction '{}' is not a number: {}", dir, e))
        })?,
        None => 0,
    };
    Wind::new(direction, speed, parse_integer(gust)).map(Some)
}

fn parse_observation_time(value: &str) -> Result<OffsetDateTime, Error> {
    let without_zone = value.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let without_fraction = without_zone.split('.').next().unwrap_or(without_zone);
    let description = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(without_fraction, description)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| {
            Error::InvalidObservation(format!(
                "error parsing observation_time '{}': {}",
                value, e
            ))
        })
}

/// Finds the `DDHHMMZ` group that follows the station id and drops the zone marker.
fn report_time_token(raw_text: &str) -> Option<String> {
    raw_text
        .split_whitespace()
        .skip_while(|part| *part == "METAR" || *part == "SPECI")
        .nth(1)
        .filter(|token| {
            token.is_ascii()
                && token.len() == 7
                && token.ends_with('Z')
                && token[..6].chars().all(|c| c.is_ascii_digit())
        })
        .map(|token| token[..6].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn raw_metar() -> RawMetar {
        RawMetar {
            raw_text: Some(String::from(
                "KSEA 051453Z 09010G20KT 6SM -RA BKN012 OVC025 M02/M05 A3001",
            )),
            station_id: Some(String::from("KSEA")),
            observation_time: Some(String::from("2024-03-05T14:53:00Z")),
            temp_c: Some(String::from("-1.6")),
            dewpoint_c: Some(String::from("-5.0")),
            wind_dir_degrees: Some(String::from("90")),
            wind_speed_kt: Some(String::from("10")),
            wind_gust_kt: Some(String::from("20")),
            visibility_statute_mi: Some(String::from("6.0")),
            altim_in_hg: Some(String::from("30.019685")),
            wx_string: Some(String::from("-RA")),
            sky_condition: vec![
                RawSkyCondition {
                    sky_cover: String::from("BKN"),
                    cloud_base_ft_agl: Some(String::from("1200")),
                },
                RawSkyCondition {
                    sky_cover: String::from("OVC"),
                    cloud_base_ft_agl: Some(String::from("2500")),
                },
            ],
            flight_category: Some(String::from("MVFR")),
        }
    }

    #[test]
    fn test_parses_full_record() {
        let record = ObservationRecord::try_from(raw_metar()).unwrap();
        assert_eq!(record.station_id, "KSEA");
        assert_eq!(record.observed_at, datetime!(2024-03-05 14:53 UTC));
        assert_eq!(record.report_time, "051453");
        assert_eq!(record.temp_c, Some(-2));
        assert_eq!(record.dewpoint_c, Some(-5));
        assert_eq!(record.wind.map(|w| w.render()), Some(String::from("090@10G20")));
        assert_eq!(record.visibility_mi, Some(6.0));
        assert_eq!(record.altimeter_inhg, Some(30.01));
        assert_eq!(record.flight_category, Some(FlightCategory::Mvfr));
        assert_eq!(record.ceiling_ft(), Some(1200));
        assert_eq!(record.weather_phenomena, "-RA");
        assert_eq!(record.temp_and_dewpoint(), "M02/M05");
    }

    #[test]
    fn test_relative_humidity_matches_magnus() {
        assert_eq!(relative_humidity(20, 10), Some(53));
        assert_eq!(relative_humidity(2, -5), Some(60));
        assert_eq!(relative_humidity(15, 15), Some(100));
    }

    #[test]
    fn test_relative_humidity_off_the_curve_is_absent() {
        assert_eq!(relative_humidity(-243, 10), None);
    }

    #[test]
    fn test_out_of_range_temperature_is_absent() {
        let mut raw = raw_metar();
        raw.temp_c = Some(String::from("1e12"));
        raw.dewpoint_c = Some(String::from("inf"));
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.temp_c, None);
        assert_eq!(record.dewpoint_c, None);
        assert_eq!(record.relative_humidity_pct, None);
    }

    #[test]
    fn test_out_of_range_wind_speed_is_invalid() {
        let mut raw = raw_metar();
        raw.wind_speed_kt = Some(String::from("5000000000"));
        raw.wind_gust_kt = None;
        assert!(matches!(
            ObservationRecord::try_from(raw),
            Err(Error::InvalidObservation(_))
        ));
    }

    #[test]
    fn test_humidity_needs_both_inputs() {
        let mut raw = raw_metar();
        raw.dewpoint_c = None;
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.temp_c, Some(-2));
        assert_eq!(record.relative_humidity_pct, None);
        assert_eq!(record.temp_and_dewpoint(), "M02/--");
    }

    #[test]
    fn test_missing_optionals_stay_absent() {
        let raw = RawMetar {
            raw_text: Some(String::from("KXYZ 051453Z AUTO")),
            station_id: Some(String::from("KXYZ")),
            observation_time: Some(String::from("2024-03-05T14:53:00Z")),
            ..Default::default()
        };
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.wind, None);
        assert_eq!(record.visibility_mi, None);
        assert_eq!(record.altimeter_inhg, None);
        assert_eq!(record.sky, None);
        assert_eq!(record.flight_category, None);
        assert_eq!(record.weather_phenomena, "");
        assert_eq!(record.to_string(), "KXYZ -- -- -- --/-- -- --");
    }

    #[test]
    fn test_calm_wind_is_not_missing_wind() {
        let mut raw = raw_metar();
        raw.wind_dir_degrees = Some(String::from("0"));
        raw.wind_speed_kt = Some(String::from("0"));
        raw.wind_gust_kt = None;
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.wind.map(|w| w.render()), Some(String::from("CALM")));
    }

    #[test]
    fn test_feed_quirks() {
        let mut raw = raw_metar();
        raw.wind_dir_degrees = Some(String::from("VRB"));
        raw.wind_gust_kt = None;
        raw.visibility_statute_mi = Some(String::from("10+"));
        raw.observation_time = Some(String::from("2024-03-05T14:53:00.000Z"));
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.wind.map(|w| w.render()), Some(String::from("VRB@10")));
        assert_eq!(record.visibility_mi, Some(10.0));
        assert_eq!(record.observed_at, datetime!(2024-03-05 14:53 UTC));
    }

    #[test]
    fn test_bad_sky_cover_names_station() {
        let mut raw = raw_metar();
        raw.sky_condition[0].sky_cover = String::from("XXX");
        let err = ObservationRecord::try_from(raw).unwrap_err();
        match err {
            Error::InvalidObservation(reason) => assert!(reason.starts_with("KSEA:")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_station_is_invalid() {
        let mut raw = raw_metar();
        raw.station_id = None;
        assert!(matches!(
            ObservationRecord::try_from(raw),
            Err(Error::InvalidObservation(_))
        ));
    }

    #[test]
    fn test_age_is_computed_against_now() {
        let record = ObservationRecord::try_from(raw_metar()).unwrap();
        assert_eq!(record.age_minutes(datetime!(2024-03-05 15:08 UTC)), 15);
        assert_eq!(record.age_minutes(datetime!(2024-03-05 15:08:59 UTC)), 15);
        assert_eq!(
            record.age_bucket(datetime!(2024-03-05 15:08 UTC)),
            AgeBucket::Fresh
        );
        assert_eq!(
            record.age_bucket(datetime!(2024-03-05 15:38 UTC)),
            AgeBucket::Stale
        );
        assert_eq!(
            record.age_bucket(datetime!(2024-03-05 16:23 UTC)),
            AgeBucket::Old
        );
    }

    #[test]
    fn test_report_time_falls_back_to_observation_time() {
        let mut raw = raw_metar();
        raw.raw_text = Some(String::from("METAR KSEA"));
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.report_time, "051453");
    }

    #[test]
    fn test_report_time_skips_metar_prefix() {
        let mut raw = raw_metar();
        raw.raw_text = Some(String::from("SPECI KSEA 051502Z 09010KT"));
        let record = ObservationRecord::try_from(raw).unwrap();
        assert_eq!(record.report_time, "051502");
    }
}
