// Delimited-text decoder - CSV / semicolon / TSV sensor-log exports
//
// Columns are located from the header by name tokens, so exports such as
// "Time (s), Linear Acceleration x (m/s^2), ..." and
// "time, seconds_elapsed, z, y, x" both decode. Lines starting with '#' may
// carry `key: value` metadata.

use chrono::{DateTime, Utc};

use super::{truncate_samples, SampleDecoder};
use crate::analysis::{Sample, SampleSeries};
use crate::error::IngestError;

/// Delimiters tried, in order, when none is configured.
const CANDIDATE_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Decoder for delimited text with a header row.
pub struct DelimitedDecoder {
    delimiter: Option<char>,
    max_samples: usize,
}

/// Indices of the required columns within a row.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    time: usize,
    x: usize,
    y: usize,
    z: usize,
    names: Vec<String>,
}

impl ColumnMap {
    fn from_header(names: Vec<String>) -> Result<Self, IngestError> {
        let tokens: Vec<Vec<String>> = names.iter().map(|name| name_tokens(name)).collect();
        let has = |idx: usize, wanted: &[&str]| {
            tokens[idx].iter().any(|t| wanted.contains(&t.as_str()))
        };

        // Elapsed-seconds columns beat wall-clock timestamps
        let time = (0..names.len())
            .find(|&i| has(i, &["elapsed"]))
            .or_else(|| (0..names.len()).find(|&i| has(i, &["time", "timestamp", "seconds", "t"])))
            .ok_or_else(|| IngestError::MissingColumn {
                column: "time".to_string(),
            })?;

        let axis = |label: &str, aliases: &[&str]| {
            (0..names.len())
                .find(|&i| i != time && has(i, aliases))
                .ok_or_else(|| IngestError::MissingColumn {
                    column: label.to_string(),
                })
        };

        Ok(Self {
            time,
            x: axis("x", &["x", "ax", "accx"])?,
            y: axis("y", &["y", "ay", "accy"])?,
            z: axis("z", &["z", "az", "accz"])?,
            names,
        })
    }

    fn width(&self) -> usize {
        self.time.max(self.x).max(self.y).max(self.z) + 1
    }
}

/// Lowercase alphanumeric tokens of a header name.
fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

fn detect_delimiter(header: &str) -> char {
    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .max_by_key(|d| header.matches(*d).count())
        .filter(|d| header.contains(*d))
        .unwrap_or(',')
}

/// Metadata carried in `# key: value` comment lines.
#[derive(Debug, Default)]
struct Metadata {
    start_time: Option<DateTime<Utc>>,
    target_sample_rate: Option<f64>,
    max_device_sample_rate: Option<f64>,
}

impl Metadata {
    fn apply(&mut self, comment: &str) -> Result<(), IngestError> {
        let Some((key, value)) = comment.split_once([':', '=']) else {
            return Ok(());
        };
        let key = key.trim().to_ascii_lowercase().replace(' ', "_");
        let value = value.trim();
        let invalid = || IngestError::InvalidMetadata {
            key: key.clone(),
            value: value.to_string(),
        };

        match key.as_str() {
            "start_time" => {
                self.start_time = Some(parse_start_time(value).ok_or_else(invalid)?);
            }
            "sample_rate" | "target_sample_rate" => {
                self.target_sample_rate = Some(value.parse().map_err(|_| invalid())?);
            }
            "max_sample_rate" | "max_device_sample_rate" => {
                self.max_device_sample_rate = Some(value.parse().map_err(|_| invalid())?);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Accept RFC 3339 timestamps or Unix epoch seconds.
fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let seconds: f64 = value.parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

impl DelimitedDecoder {
    pub fn new(delimiter: Option<char>, max_samples: usize) -> Self {
        Self {
            delimiter,
            max_samples,
        }
    }

    fn parse_cell(
        &self,
        fields: &[&str],
        idx: usize,
        delimiter: char,
        line: usize,
        columns: &ColumnMap,
    ) -> Result<f64, IngestError> {
        let raw = unquote(fields[idx]);
        // Semicolon / tab exports often use a decimal comma
        let normalized = if delimiter != ',' {
            raw.replace(',', ".")
        } else {
            raw.to_string()
        };
        normalized
            .parse::<f64>()
            .map_err(|_| IngestError::InvalidValue {
                line,
                column: columns.names[idx].clone(),
                value: raw.to_string(),
            })
    }
}

impl SampleDecoder for DelimitedDecoder {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn decode(&self, input: &str) -> Result<SampleSeries, IngestError> {
        let mut metadata = Metadata::default();
        let mut layout: Option<(char, ColumnMap)> = None;
        let mut samples = Vec::new();

        for (idx, raw_line) in input.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw_line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if let Some(comment) = line.trim_start().strip_prefix('#') {
                metadata.apply(comment)?;
                continue;
            }

            let (delimiter, columns) = match &layout {
                Some((delimiter, columns)) => (*delimiter, columns),
                None => {
                    let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(line));
                    let names = line
                        .split(delimiter)
                        .map(|name| unquote(name).to_string())
                        .collect();
                    layout = Some((delimiter, ColumnMap::from_header(names)?));
                    continue;
                }
            };

            let fields: Vec<&str> = line.split(delimiter).collect();
            if fields.len() < columns.width() {
                return Err(IngestError::InvalidValue {
                    line: line_number,
                    column: columns.names[columns.width() - 1].clone(),
                    value: String::new(),
                });
            }

            let cell = |i| self.parse_cell(&fields, i, delimiter, line_number, columns);
            samples.push(Sample::new(
                cell(columns.time)?,
                cell(columns.x)?,
                cell(columns.y)?,
                cell(columns.z)?,
            ));
        }

        if samples.is_empty() {
            return Err(IngestError::Empty);
        }

        let mut series = SampleSeries::new(samples, metadata.start_time.unwrap_or_default());
        series.target_sample_rate = metadata.target_sample_rate;
        series.max_device_sample_rate = metadata.max_device_sample_rate;
        truncate_samples(&mut series, self.max_samples);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decoder() -> DelimitedDecoder {
        DelimitedDecoder::new(None, 20_000)
    }

    #[test]
    fn test_phyphox_style_header() {
        let input = "\"Time (s)\",\"Linear Acceleration x (m/s^2)\",\"Linear Acceleration y (m/s^2)\",\"Linear Acceleration z (m/s^2)\"\n\
                     1.414400000E-2,1.2E-3,-4.5E-3,2.1E-2\n\
                     3.272000000E-2,1.0E-3,-4.0E-3,2.0E-2\n";
        let series = decoder().decode(input).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.samples[0].time, 0.014144);
        assert_eq!(series.samples[1].az, 0.02);
    }

    #[test]
    fn test_sensor_logger_prefers_elapsed_seconds() {
        let input = "time,seconds_elapsed,z,y,x\n\
                     1717229700000000000,0.0,9.8,0.2,0.1\n\
                     1717229700010000000,0.01,9.7,0.3,0.4\n";
        let series = decoder().decode(input).unwrap();
        assert_eq!(series.samples[1], Sample::new(0.01, 0.4, 0.3, 9.7));
    }

    #[test]
    fn test_semicolon_with_decimal_comma() {
        let input = "t;ax;ay;az\n0,0;0,5;0,25;9,75\n0,1;0,5;0,25;9,5\n";
        let series = decoder().decode(input).unwrap();
        assert_eq!(series.samples[1], Sample::new(0.1, 0.5, 0.25, 9.5));
    }

    #[test]
    fn test_metadata_comments() {
        let input = "# start_time: 2024-06-01T08:15:00Z\n\
                     # sample rate = 100\n\
                     # max_sample_rate: 400\n\
                     # device: pixel\n\
                     time\tx\ty\tz\n\
                     0.0\t0\t0\t1\n\
                     0.01\t0\t0\t1\n";
        let series = decoder().decode(input).unwrap();
        assert_eq!(
            series.start_time,
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap()
        );
        assert_eq!(series.target_sample_rate, Some(100.0));
        assert_eq!(series.max_device_sample_rate, Some(400.0));
    }

    #[test]
    fn test_epoch_start_time() {
        assert_eq!(
            parse_start_time("1717229700.5"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap() + chrono::Duration::milliseconds(500))
        );
        assert_eq!(parse_start_time("tomorrow"), None);
    }

    #[test]
    fn test_invalid_metadata_rejected() {
        let input = "# start_time: tomorrow\ntime,x,y,z\n0,0,0,1\n";
        assert_eq!(
            decoder().decode(input).unwrap_err(),
            IngestError::InvalidMetadata {
                key: "start_time".to_string(),
                value: "tomorrow".to_string()
            }
        );
    }

    #[test]
    fn test_missing_axis_column() {
        let input = "time,x,y\n0,0,0\n";
        assert_eq!(
            decoder().decode(input).unwrap_err(),
            IngestError::MissingColumn {
                column: "z".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_cell_reports_line_and_column() {
        let input = "time,x,y,z\n0.0,0,0,1\n0.1,NaN?,0,1\n";
        assert_eq!(
            decoder().decode(input).unwrap_err(),
            IngestError::InvalidValue {
                line: 3,
                column: "x".to_string(),
                value: "NaN?".to_string()
            }
        );
    }

    #[test]
    fn test_short_row_rejected() {
        let input = "time,x,y,z\n0.0,0,0\n";
        assert!(matches!(
            decoder().decode(input),
            Err(IngestError::InvalidValue { line: 2, .. })
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert_eq!(
            decoder().decode("time,x,y,z\n\n").unwrap_err(),
            IngestError::Empty
        );
        assert_eq!(decoder().decode("").unwrap_err(), IngestError::Empty);
    }

    #[test]
    fn test_max_samples_limit() {
        let mut input = String::from("time,x,y,z\n");
        for i in 0..50 {
            input.push_str(&format!("{},0,0,1\n", i as f64 * 0.01));
        }
        let series = DelimitedDecoder::new(Some(','), 20).decode(&input).unwrap();
        assert_eq!(series.len(), 20);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("abc"), ',');
    }
}
