// Metrics module - Metric kinds, frequency bands and requested-metric sets
//
// Every metric the engine can produce is a variant of `MetricKind`. The set of
// requested kinds decides which computations run for each window; unrequested
// kinds are never computed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// A frequency band `[low_hz, high_hz)` in whole Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: u16,
    pub high_hz: u16,
}

impl FrequencyBand {
    pub const fn new(low_hz: u16, high_hz: u16) -> Self {
        Self { low_hz, high_hz }
    }

    /// Whether any FFT bin below Nyquist can fall inside this band.
    ///
    /// Bands whose lower edge sits at or above `rate / 2` always yield 0.
    pub fn is_measurable(&self, rate: f64) -> bool {
        (self.low_hz as f64) < rate / 2.0
    }

    /// Look up one of the twelve canonical bands.
    pub fn standard(low_hz: u16, high_hz: u16) -> Option<Self> {
        STANDARD_BANDS
            .iter()
            .copied()
            .find(|band| band.low_hz == low_hz && band.high_hz == high_hz)
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} Hz", self.low_hz, self.high_hz)
    }
}

/// The twelve fixed analysis bands covering 0-100 Hz.
pub const STANDARD_BANDS: [FrequencyBand; 12] = [
    FrequencyBand::new(0, 1),
    FrequencyBand::new(1, 5),
    FrequencyBand::new(5, 10),
    FrequencyBand::new(10, 20),
    FrequencyBand::new(20, 30),
    FrequencyBand::new(30, 40),
    FrequencyBand::new(40, 50),
    FrequencyBand::new(50, 60),
    FrequencyBand::new(60, 70),
    FrequencyBand::new(70, 80),
    FrequencyBand::new(80, 90),
    FrequencyBand::new(90, 100),
];

/// One of the 17 per-window metrics.
///
/// Ordering follows the report column order: axis RMS, total RMS,
/// percentile, then bands by ascending frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    RmsX,
    RmsY,
    RmsZ,
    RmsTotal,
    Percentile90,
    Band(FrequencyBand),
}

impl MetricKind {
    /// All 17 metric kinds in report order.
    pub fn all() -> Vec<MetricKind> {
        let mut kinds = vec![
            MetricKind::RmsX,
            MetricKind::RmsY,
            MetricKind::RmsZ,
            MetricKind::RmsTotal,
            MetricKind::Percentile90,
        ];
        kinds.extend(STANDARD_BANDS.iter().copied().map(MetricKind::Band));
        kinds
    }

    /// Canonical metric name, e.g. `rms_total` or `band_10_20`.
    pub fn name(&self) -> String {
        match self {
            MetricKind::RmsX => "rms_x".to_string(),
            MetricKind::RmsY => "rms_y".to_string(),
            MetricKind::RmsZ => "rms_z".to_string(),
            MetricKind::RmsTotal => "rms_total".to_string(),
            MetricKind::Percentile90 => "percentile_90".to_string(),
            MetricKind::Band(band) => format!("band_{}_{}", band.low_hz, band.high_hz),
        }
    }

    /// Whether this metric needs the per-sample total acceleration array.
    pub fn uses_total(&self) -> bool {
        !matches!(self, MetricKind::RmsX | MetricKind::RmsY | MetricKind::RmsZ)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for MetricKind {
    type Err = AnalysisError;

    /// Parse a canonical name, also accepting the legacy spellings
    /// `percentile_90_peak` and `freq_band_<lo>_<hi>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let unknown = || AnalysisError::UnknownMetric {
            name: s.trim().to_string(),
        };

        match name.as_str() {
            "rms_x" => return Ok(MetricKind::RmsX),
            "rms_y" => return Ok(MetricKind::RmsY),
            "rms_z" => return Ok(MetricKind::RmsZ),
            "rms_total" => return Ok(MetricKind::RmsTotal),
            "percentile_90" | "percentile_90_peak" => return Ok(MetricKind::Percentile90),
            _ => {}
        }

        let bounds = name
            .strip_prefix("freq_band_")
            .or_else(|| name.strip_prefix("band_"))
            .ok_or_else(unknown)?;
        let (low, high) = bounds.split_once('_').ok_or_else(unknown)?;
        let low: u16 = low.parse().map_err(|_| unknown())?;
        let high: u16 = high.parse().map_err(|_| unknown())?;

        FrequencyBand::standard(low, high)
            .map(MetricKind::Band)
            .ok_or_else(unknown)
    }
}

impl Serialize for MetricKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Set of requested metrics, iterated in report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeSet<MetricKind>);

impl MetricSet {
    pub fn new<I: IntoIterator<Item = MetricKind>>(kinds: I) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Every one of the 17 metrics.
    pub fn all() -> Self {
        Self::new(MetricKind::all())
    }

    /// Parse a comma-separated list such as `rms_x,rms_total,band_10_20`.
    ///
    /// Blank entries are ignored; the literal `all` expands to every metric.
    pub fn parse_list(list: &str) -> Result<Self, AnalysisError> {
        let mut kinds = BTreeSet::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry.eq_ignore_ascii_case("all") {
                kinds.extend(MetricKind::all());
            } else {
                kinds.insert(entry.parse()?);
            }
        }
        Ok(Self(kinds))
    }

    pub fn contains(&self, kind: MetricKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.0.iter().copied()
    }

    /// Requested band metrics, ascending by frequency.
    pub fn bands(&self) -> impl Iterator<Item = FrequencyBand> + '_ {
        self.0.iter().filter_map(|kind| match kind {
            MetricKind::Band(band) => Some(*band),
            _ => None,
        })
    }

    pub fn needs_totals(&self) -> bool {
        self.0.iter().any(MetricKind::uses_total)
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<MetricKind> for MetricSet {
    fn from_iter<I: IntoIterator<Item = MetricKind>>(iter: I) -> Self {
        Self::new(iter)
    }
}
