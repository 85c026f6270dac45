use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Flight category, ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
}

impl FlightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
        }
    }

    /// Tier for a visibility in statute miles.
    pub fn from_visibility(miles: f64) -> Self {
        if miles >= 5.0 {
            FlightCategory::Vfr
        } else if miles >= 3.0 {
            FlightCategory::Mvfr
        } else if miles >= 1.0 {
            FlightCategory::Ifr
        } else {
            FlightCategory::Lifr
        }
    }

    /// Tier for a ceiling in feet AGL, no ceiling at all is VFR.
    pub fn from_ceiling(altitude_ft: Option<u32>) -> Self {
        match altitude_ft {
            None => FlightCategory::Vfr,
            Some(ft) if ft > 3000 => FlightCategory::Vfr,
            Some(ft) if ft > 1000 => FlightCategory::Mvfr,
            Some(ft) if ft >= 500 => FlightCategory::Ifr,
            Some(_) => FlightCategory::Lifr,
        }
    }
}

impl FromStr for FlightCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "VFR" => Ok(FlightCategory::Vfr),
            "MVFR" => Ok(FlightCategory::Mvfr),
            "IFR" => Ok(FlightCategory::Ifr),
            "LIFR" => Ok(FlightCategory::Lifr),
            other => Err(Error::InvalidObservation(format!(
                "unrecognized flight category '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBucket {
    Fresh,
    Stale,
    Old,
}

impl AgeBucket {
    pub fn from_minutes(age_minutes: i64) -> Self {
        if age_minutes <= 20 {
            AgeBucket::Fresh
        } else if age_minutes <= 60 {
            AgeBucket::Stale
        } else {
            AgeBucket::Old
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_tiers() {
        assert_eq!(FlightCategory::from_visibility(6.0), FlightCategory::Vfr);
        assert_eq!(FlightCategory::from_visibility(5.0), FlightCategory::Vfr);
        assert_eq!(FlightCategory::from_visibility(4.0), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::from_visibility(3.0), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::from_visibility(2.0), FlightCategory::Ifr);
        assert_eq!(FlightCategory::from_visibility(1.0), FlightCategory::Ifr);
        assert_eq!(FlightCategory::from_visibility(0.5), FlightCategory::Lifr);
    }

    #[test]
    fn test_ceiling_tiers() {
        assert_eq!(FlightCategory::from_ceiling(Some(3500)), FlightCategory::Vfr);
        assert_eq!(FlightCategory::from_ceiling(Some(3000)), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::from_ceiling(Some(2000)), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::from_ceiling(Some(1000)), FlightCategory::Ifr);
        assert_eq!(FlightCategory::from_ceiling(Some(800)), FlightCategory::Ifr);
        assert_eq!(FlightCategory::from_ceiling(Some(500)), FlightCategory::Ifr);
        assert_eq!(FlightCategory::from_ceiling(Some(300)), FlightCategory::Lifr);
        assert_eq!(FlightCategory::from_ceiling(None), FlightCategory::Vfr);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(FlightCategory::Vfr < FlightCategory::Mvfr);
        assert!(FlightCategory::Ifr < FlightCategory::Lifr);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("MVFR".parse::<FlightCategory>().unwrap(), FlightCategory::Mvfr);
        assert!("XVFR".parse::<FlightCategory>().is_err());
    }

    #[test]
    fn test_age_buckets() {
        assert_eq!(AgeBucket::from_minutes(15), AgeBucket::Fresh);
        assert_eq!(AgeBucket::from_minutes(20), AgeBucket::Fresh);
        assert_eq!(AgeBucket::from_minutes(45), AgeBucket::Stale);
        assert_eq!(AgeBucket::from_minutes(60), AgeBucket::Stale);
        assert_eq!(AgeBucket::from_minutes(90), AgeBucket::Old);
    }
}
