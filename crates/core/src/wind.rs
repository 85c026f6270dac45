use std::fmt;

use crate::Error;

/// Surface wind as reported in a METAR.
///
/// A direction of `0` means the wind is variable, true north is reported as `360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wind {
    pub direction: u16,
    pub speed: u32,
    pub gust: Option<u32>,
}

impl Wind {
    pub fn new(direction: i64, speed: i64, gust: Option<i64>) -> Result<Self, Error> {
        if !(0..=360).contains(&direction) {
            return Err(Error::InvalidObservation(format!(
                "wind direction {} outside 0-360",
                direction
            )));
        }
        let speed = knots(speed)?;
        // a gust that does not exceed the sustained speed is not a gust
        let gust = gust.map(knots).transpose()?.filter(|g| *g > speed);
        Ok(Wind {
            direction: direction as u16,
            speed,
            gust,
        })
    }

    pub fn is_variable(&self) -> bool {
        self.direction == 0
    }

    pub fn is_calm(&self) -> bool {
        self.speed == 0 && self.gust.is_none()
    }

    fn direction_text(&self) -> String {
        if self.is_variable() {
            String::from("VRB")
        } else {
            format!("{:03}", self.direction)
        }
    }

    /// Display form: `CALM`, `VRB@05`, `090@10`, `090@10G20`.
    pub fn render(&self) -> String {
        match self.gust {
            None if self.speed == 0 => String::from("CALM"),
            None => format!("{}@{:02}", self.direction_text(), self.speed),
            Some(gust) => format!("{}@{:02}G{}", self.direction_text(), self.speed, gust),
        }
    }

    /// METAR-encoded form: `09010KT`, `27015G25KT`.
    pub fn encoded(&self) -> String {
        match self.gust {
            None => format!("{}{:02}KT", self.direction_text(), self.speed),
            Some(gust) => format!("{}{:02}G{}KT", self.direction_text(), self.speed, gust),
        }
    }
}

fn knots(value: i64) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| {
        Error::InvalidObservation(format!("wind speed {} kt out of range", value))
    })
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_direction() {
        let wind = Wind::new(0, 5, None).unwrap();
        assert_eq!(wind.render(), "VRB@05");
        assert_eq!(wind.encoded(), "VRB05KT");
    }

    #[test]
    fn test_calm() {
        assert_eq!(Wind::new(0, 0, None).unwrap().render(), "CALM");
        assert_eq!(Wind::new(270, 0, None).unwrap().render(), "CALM");
    }

    #[test]
    fn test_steady_and_gusting() {
        assert_eq!(Wind::new(90, 10, None).unwrap().render(), "090@10");
        assert_eq!(Wind::new(90, 10, Some(20)).unwrap().render(), "090@10G20");
        assert_eq!(Wind::new(270, 15, Some(25)).unwrap().encoded(), "27015G25KT");
    }

    #[test]
    fn test_gust_not_above_speed_is_dropped() {
        let wind = Wind::new(180, 12, Some(12)).unwrap();
        assert_eq!(wind.gust, None);
        assert_eq!(wind.render(), "180@12");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            Wind::new(361, 5, None),
            Err(Error::InvalidObservation(_))
        ));
        assert!(matches!(
            Wind::new(90, -1, None),
            Err(Error::InvalidObservation(_))
        ));
        assert!(matches!(
            Wind::new(90, 5_000_000_000, None),
            Err(Error::InvalidObservation(_))
        ));
        assert!(matches!(
            Wind::new(90, 10, Some(6_000_000_000)),
            Err(Error::InvalidObservation(_))
        ));
    }
}
