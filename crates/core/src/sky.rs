use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// CLR, SKC and CAVOK all mean no cloud worth reporting
    Clear,
    Few,
    Scattered,
    Broken,
    Overcast,
    Obscured,
}

impl Coverage {
    pub fn is_clear(&self) -> bool {
        matches!(self, Coverage::Clear)
    }

    pub fn is_ceiling(&self) -> bool {
        matches!(
            self,
            Coverage::Broken | Coverage::Overcast | Coverage::Obscured
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Coverage::Clear => "CLR",
            Coverage::Few => "FEW",
            Coverage::Scattered => "SCT",
            Coverage::Broken => "BKN",
            Coverage::Overcast => "OVC",
            Coverage::Obscured => "OVX",
        }
    }
}

impl FromStr for Coverage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CLR" | "SKC" | "CAVOK" => Ok(Coverage::Clear),
            "FEW" => Ok(Coverage::Few),
            "SCT" => Ok(Coverage::Scattered),
            "BKN" => Ok(Coverage::Broken),
            "OVC" => Ok(Coverage::Overcast),
            "OVX" => Ok(Coverage::Obscured),
            other => Err(Error::InvalidObservation(format!(
                "unrecognized sky cover '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudLayer {
    pub coverage: Coverage,
    /// Base of the layer in feet above ground, `None` only for clear layers.
    pub altitude_agl_ft: Option<u32>,
}

static CLEAR_LAYER: CloudLayer = CloudLayer {
    coverage: Coverage::Clear,
    altitude_agl_ft: None,
};

impl CloudLayer {
    pub fn new(cover: &str, base_ft_agl: Option<&str>) -> Result<Self, Error> {
        let coverage: Coverage = cover.parse()?;
        if coverage.is_clear() {
            return Ok(CloudLayer {
                coverage,
                altitude_agl_ft: None,
            });
        }

        let base = base_ft_agl.ok_or_else(|| {
            Error::InvalidObservation(format!("{} layer without a cloud base", coverage.code()))
        })?;
        let altitude = base.trim().parse::<u32>().map_err(|e| {
            Error::InvalidObservation(format!("cloud base '{}' is not a number: {}", base, e))
        })?;
        Ok(CloudLayer {
            coverage,
            altitude_agl_ft: Some(altitude),
        })
    }

    pub fn is_ceiling(&self) -> bool {
        self.coverage.is_ceiling()
    }

    pub fn is_clear(&self) -> bool {
        self.coverage.is_clear()
    }
}

impl fmt::Display for CloudLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.coverage, self.altitude_agl_ft) {
            (Coverage::Clear, _) | (Coverage::Obscured, _) | (_, None) => {
                write!(f, "{}", self.coverage.code())
            }
            (coverage, Some(altitude)) => write!(f, "{}@{}", coverage.code(), altitude),
        }
    }
}

/// The sky condition groups of one report, kept in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyState {
    layers: Vec<CloudLayer>,
}

impl SkyState {
    /// Returns `None` when no layers are given, a sky state always holds at least one layer.
    pub fn new(layers: Vec<CloudLayer>) -> Option<Self> {
        if layers.is_empty() {
            None
        } else {
            Some(SkyState { layers })
        }
    }

    pub fn layers(&self) -> &[CloudLayer] {
        &self.layers
    }

    /// A clear first layer marks the whole report as clear.
    pub fn is_clear(&self) -> bool {
        self.layers[0].is_clear()
    }

    /// Lowest reported layer of any coverage, `None` when the sky is clear.
    pub fn lowest(&self) -> Option<&CloudLayer> {
        self.lowest_matching(|_| true)
    }

    /// Lowest broken, overcast or obscured layer.
    pub fn ceiling(&self) -> Option<&CloudLayer> {
        self.lowest_matching(CloudLayer::is_ceiling)
    }

    pub fn ceiling_or_lowest(&self) -> &CloudLayer {
        self.ceiling()
            .or_else(|| self.lowest())
            .unwrap_or(&CLEAR_LAYER)
    }

    pub fn all_layers(&self) -> String {
        if self.is_clear() {
            return String::from("CLR");
        }
        self.layers
            .iter()
            .map(|layer| layer.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn lowest_matching<P>(&self, predicate: P) -> Option<&CloudLayer>
    where
        P: Fn(&CloudLayer) -> bool,
    {
        if self.is_clear() {
            return None;
        }
        let mut lowest: Option<(&CloudLayer, u32)> = None;
        for layer in self.layers.iter().filter(|layer| predicate(*layer)) {
            let Some(altitude) = layer.altitude_agl_ft else {
                continue;
            };
            match lowest {
                // strict comparison keeps the first layer on a tie
                Some((_, current)) if altitude >= current => {}
                _ => lowest = Some((layer, altitude)),
            }
        }
        lowest.map(|(layer, _)| layer)
    }
}

impl fmt::Display for SkyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.all_layers())
    }
}
