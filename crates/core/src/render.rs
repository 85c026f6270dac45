//! Fixed-width report rendering
//!
//! Every line is laid out in the same columns as [`Renderer::header`]. Padding is computed on the
//! plain text so terminal escape sequences never shift the columns.

use std::sync::OnceLock;

use crossterm::style::{style, Attribute, Color, Stylize};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{AgeBucket, Error, FlightCategory, ObservationRecord};

const MISSING: &str = "--";

// STN, TIME, CAT, WIND, ALTM, T/DP, RH, VIS, CEIL; WX takes the rest of the line
const COLUMN_WIDTHS: [usize; 9] = [5, 8, 6, 11, 7, 9, 6, 7, 11];
const HEADER: [&str; 10] = [
    "STN", "TIME", "CAT", "WIND", "ALTM", "T/DP", "RH", "VIS", "CEIL", "WX",
];

/// Terminal colors for each severity tier and observation age.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub vfr: Color,
    pub mvfr: Color,
    pub ifr: Color,
    pub lifr: Color,
    pub stale: Color,
    pub old: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            vfr: Color::Green,
            mvfr: Color::Blue,
            ifr: Color::Red,
            lifr: Color::Magenta,
            stale: Color::Yellow,
            old: Color::Red,
        }
    }
}

/// Color overrides as read from the `[colors]` config table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaletteConfig {
    pub vfr: Option<String>,
    pub mvfr: Option<String>,
    pub ifr: Option<String>,
    pub lifr: Option<String>,
    pub stale: Option<String>,
    pub old: Option<String>,
}

impl Palette {
    pub fn from_config(config: &PaletteConfig) -> Result<Self, Error> {
        let defaults = Palette::default();
        let pick = |name: &Option<String>, fallback: Color| match name {
            Some(name) => parse_color(name),
            None => Ok(fallback),
        };
        Ok(Palette {
            vfr: pick(&config.vfr, defaults.vfr)?,
            mvfr: pick(&config.mvfr, defaults.mvfr)?,
            ifr: pick(&config.ifr, defaults.ifr)?,
            lifr: pick(&config.lifr, defaults.lifr)?,
            stale: pick(&config.stale, defaults.stale)?,
            old: pick(&config.old, defaults.old)?,
        })
    }

    pub fn tier(&self, category: FlightCategory) -> Color {
        match category {
            FlightCategory::Vfr => self.vfr,
            FlightCategory::Mvfr => self.mvfr,
            FlightCategory::Ifr => self.ifr,
            FlightCategory::Lifr => self.lifr,
        }
    }

    /// Fresh observations are printed as is.
    pub fn age(&self, bucket: AgeBucket) -> Option<Color> {
        match bucket {
            AgeBucket::Fresh => None,
            AgeBucket::Stale => Some(self.stale),
            AgeBucket::Old => Some(self.old),
        }
    }
}

static PALETTE: OnceLock<Palette> = OnceLock::new();

/// Sets the process-wide palette. Only the first call wins, returns false afterwards.
pub fn install_palette(palette: Palette) -> bool {
    PALETTE.set(palette).is_ok()
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::default)
}

fn parse_color(name: &str) -> Result<Color, Error> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase();
    let color = match key.as_str() {
        "black" => Color::Black,
        "darkgrey" | "darkgray" => Color::DarkGrey,
        "red" => Color::Red,
        "darkred" => Color::DarkRed,
        "green" => Color::Green,
        "darkgreen" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "darkyellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "darkblue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "darkmagenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "darkcyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "unknown color name '{}'",
                name
            )))
        }
    };
    Ok(color)
}

#[derive(Debug, Clone, Copy)]
enum Emphasis {
    Plain,
    Color(Color),
    Strong(Color),
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
    palette: &'static Palette,
}

impl Renderer {
    /// Renderer using the installed palette, `color = false` produces plain text.
    pub fn new(color: bool) -> Self {
        Renderer {
            color,
            palette: palette(),
        }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn header(&self) -> String {
        let cells = HEADER.iter().map(|title| (title.to_string(), Emphasis::Plain));
        self.layout(cells)
    }

    pub fn line(&self, record: &ObservationRecord, now: OffsetDateTime) -> String {
        let bucket = record.age_bucket(now);
        let time = match (bucket, self.palette.age(bucket)) {
            (_, None) => Emphasis::Plain,
            (AgeBucket::Old, Some(color)) => Emphasis::Strong(color),
            (_, Some(color)) => Emphasis::Color(color),
        };

        let category = match record.flight_category {
            Some(category) => (
                category.to_string(),
                Emphasis::Color(self.palette.tier(category)),
            ),
            None => (MISSING.to_string(), Emphasis::Plain),
        };

        let visibility = match record.visibility_mi {
            Some(miles) => (
                format_visibility(miles),
                Emphasis::Color(self.palette.tier(FlightCategory::from_visibility(miles))),
            ),
            None => (MISSING.to_string(), Emphasis::Plain),
        };

        let (ceiling_text, ceiling_tier) = ceiling_cell(record);

        let cells = vec![
            (record.station_id.clone(), Emphasis::Plain),
            (record.report_time.clone(), time),
            category,
            (
                record
                    .wind
                    .map(|wind| wind.render())
                    .unwrap_or_else(|| MISSING.to_string()),
                Emphasis::Plain,
            ),
            (
                record
                    .altimeter_inhg
                    .map(|altim| format!("{:.2}", altim))
                    .unwrap_or_else(|| MISSING.to_string()),
                Emphasis::Plain,
            ),
            (record.temp_and_dewpoint(), Emphasis::Plain),
            (
                record
                    .relative_humidity_pct
                    .map(|rh| format!("{}%", rh))
                    .unwrap_or_else(|| MISSING.to_string()),
                Emphasis::Plain,
            ),
            visibility,
            (
                ceiling_text,
                Emphasis::Color(self.palette.tier(ceiling_tier)),
            ),
            (
                match record.weather_phenomena.as_str() {
                    "" => MISSING.to_string(),
                    wx => wx.to_string(),
                },
                Emphasis::Plain,
            ),
        ];
        self.layout(cells)
    }

    /// One line per record, ordered by the four character station prefix.
    pub fn lines<'a, I>(&self, records: I, now: OffsetDateTime) -> Vec<String>
    where
        I: IntoIterator<Item = &'a ObservationRecord>,
    {
        let mut records: Vec<&ObservationRecord> = records.into_iter().collect();
        records.sort_by(|a, b| station_prefix(&a.station_id).cmp(station_prefix(&b.station_id)));
        records
            .into_iter()
            .map(|record| self.line(record, now))
            .collect()
    }

    /// Header followed by the sorted station lines.
    pub fn report<'a, I>(&self, records: I, now: OffsetDateTime) -> String
    where
        I: IntoIterator<Item = &'a ObservationRecord>,
    {
        let mut out = vec![self.header()];
        out.extend(self.lines(records, now));
        out.join("\n")
    }

    fn layout<I>(&self, cells: I) -> String
    where
        I: IntoIterator<Item = (String, Emphasis)>,
    {
        let mut line = String::new();
        for (index, (text, emphasis)) in cells.into_iter().enumerate() {
            line.push_str(&self.paint(&text, emphasis));
            if let Some(width) = COLUMN_WIDTHS.get(index) {
                let padding = width.saturating_sub(text.chars().count()).max(1);
                line.push_str(&" ".repeat(padding));
            }
        }
        line.trim_end().to_string()
    }

    fn paint(&self, text: &str, emphasis: Emphasis) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        match emphasis {
            Emphasis::Plain => text.to_string(),
            Emphasis::Color(color) => style(text).with(color).to_string(),
            Emphasis::Strong(color) => style(text)
                .with(color)
                .attribute(Attribute::Bold)
                .to_string(),
        }
    }
}

/// The ceiling if there is one, otherwise the lowest layer (or `CLR`) shown as VFR.
fn ceiling_cell(record: &ObservationRecord) -> (String, FlightCategory) {
    match record.sky.as_ref() {
        Some(sky) => match sky.ceiling() {
            Some(ceiling) => (
                ceiling.to_string(),
                FlightCategory::from_ceiling(ceiling.altitude_agl_ft),
            ),
            None => (sky.ceiling_or_lowest().to_string(), FlightCategory::Vfr),
        },
        None => (MISSING.to_string(), FlightCategory::Vfr),
    }
}

/// Visibility in statute miles, quarter miles below one mile shown as fractions.
pub fn format_visibility(miles: f64) -> String {
    const FRACTIONS: [(f64, &str); 3] = [(0.25, "1/4"), (0.5, "1/2"), (0.75, "3/4")];
    if miles < 1.0 {
        if let Some((_, text)) = FRACTIONS
            .iter()
            .find(|(value, _)| (miles - value).abs() < 1e-9)
        {
            return text.to_string();
        }
    }
    if miles.fract() == 0.0 {
        format!("{:02.0}", miles)
    } else {
        miles.to_string()
    }
}

fn station_prefix(station_id: &str) -> &str {
    match station_id.char_indices().nth(4) {
        Some((end, _)) => &station_id[..end],
        None => station_id,
    }
}
