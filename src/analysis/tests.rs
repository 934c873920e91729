use super::*;
use chrono::{DateTime, TimeZone, Utc};

fn series_at(rate: f64, n: usize) -> SampleSeries {
    let samples = (0..n)
        .map(|i| {
            let t = 3.25 + i as f64 / rate;
            Sample::new(
                t,
                0.2 * (2.0 * std::f64::consts::PI * 5.0 * t).sin(),
                0.15 * (2.0 * std::f64::consts::PI * 15.0 * t).sin(),
                9.81 + 0.1 * (2.0 * std::f64::consts::PI * 25.0 * t).sin(),
            )
        })
        .collect();
    SampleSeries::new(samples, DateTime::<Utc>::default())
}

#[test]
fn test_analyze_produces_one_record_per_window() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(200.0, 2000);
    let config = AnalysisConfig {
        window_seconds: 1.0,
        overlap_fraction: 0.5,
        ..Default::default()
    };

    let report = analyzer.analyze(&series, &config).unwrap();

    assert!((report.rate - 200.0).abs() < 1e-6);
    assert_eq!(report.sample_count, 2000);
    assert_eq!(report.window_size_samples, 200);
    assert_eq!(report.step_samples, 100);
    assert_eq!(report.records.len(), 20);
    assert!(report.unmeasurable_bands.is_empty());
    assert!(report.records.iter().all(|r| r.values.len() == 17));

    // Trailing truncated windows can share their last sample
    for pair in report.records.windows(2) {
        assert!(pair[1].time >= pair[0].time);
    }
}

#[test]
fn test_band_energy_follows_axis_vibrations() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(200.0, 2000);
    let config = AnalysisConfig {
        window_seconds: 2.0,
        overlap_fraction: 0.0,
        requested_metrics: MetricSet::parse_list("band_20_30,band_30_40,band_60_70").unwrap(),
        ..Default::default()
    };

    let report = analyzer.analyze(&series, &config).unwrap();
    let first = &report.records[0];
    let band = |lo, hi| first.get(MetricKind::Band(FrequencyBand::new(lo, hi))).unwrap();

    // 25 Hz z-axis vibration dominates its band over quieter neighbours
    assert!(band(20, 30) > band(30, 40));
    assert!(band(20, 30) > band(60, 70));
}

#[test]
fn test_unusable_series_reported_not_zeroed() {
    let analyzer = VibrationAnalyzer::new();
    let config = AnalysisConfig::default();

    let single = SampleSeries::new(
        vec![Sample::new(0.0, 0.0, 0.0, 9.81)],
        DateTime::<Utc>::default(),
    );
    assert_eq!(
        analyzer.analyze(&single, &config),
        Err(AnalysisError::UnusableSeries {
            sample_count: 1,
            span_seconds: 0.0
        })
    );

    let frozen_clock = SampleSeries::new(
        vec![
            Sample::new(2.0, 0.0, 0.0, 9.81),
            Sample::new(2.0, 0.0, 0.0, 9.81),
        ],
        DateTime::<Utc>::default(),
    );
    assert!(matches!(
        analyzer.analyze(&frozen_clock, &config),
        Err(AnalysisError::UnusableSeries { sample_count: 2, .. })
    ));
}

#[test]
fn test_invalid_configuration_fails_fast() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(100.0, 50);

    let config = AnalysisConfig {
        window_seconds: -0.5,
        ..Default::default()
    };
    assert!(matches!(
        analyzer.analyze(&series, &config),
        Err(AnalysisError::InvalidWindow { .. })
    ));

    let config = AnalysisConfig {
        overlap_fraction: 1.2,
        ..Default::default()
    };
    assert!(matches!(
        analyzer.analyze(&series, &config),
        Err(AnalysisError::InvalidOverlap { .. })
    ));

    let config = AnalysisConfig {
        requested_metrics: MetricSet::new(Vec::new()),
        ..Default::default()
    };
    assert_eq!(
        analyzer.analyze(&series, &config),
        Err(AnalysisError::EmptyMetricSet)
    );
}

#[test]
fn test_only_requested_metrics_populated() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(100.0, 300);
    let config = AnalysisConfig {
        requested_metrics: MetricSet::new([MetricKind::RmsX, MetricKind::Percentile90]),
        ..Default::default()
    };

    let report = analyzer.analyze(&series, &config).unwrap();
    for record in &report.records {
        assert_eq!(record.values.len(), 2);
        assert!(record.get(MetricKind::RmsX).is_some());
        assert!(record.get(MetricKind::Percentile90).is_some());
        assert!(record.get(MetricKind::RmsTotal).is_none());
    }
}

#[test]
fn test_low_rate_flags_unmeasurable_bands() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(50.0, 500);
    let report = analyzer
        .analyze(&series, &AnalysisConfig::default())
        .unwrap();

    let expected: Vec<FrequencyBand> = STANDARD_BANDS
        .iter()
        .copied()
        .filter(|b| b.low_hz >= 25)
        .collect();
    assert_eq!(report.unmeasurable_bands, expected);

    for record in &report.records {
        for band in &expected {
            assert_eq!(record.get(MetricKind::Band(*band)), Some(0.0));
        }
    }
}

#[test]
fn test_reconfiguration_reuses_estimate() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(100.0, 1000);
    let estimate = estimate_sample_rate(&series);

    let coarse = AnalysisConfig {
        window_seconds: 2.0,
        overlap_fraction: 0.0,
        ..Default::default()
    };
    let fine = AnalysisConfig {
        window_seconds: 0.5,
        overlap_fraction: 0.75,
        ..Default::default()
    };

    let coarse_report = analyzer.analyze_estimate(&estimate, &coarse).unwrap();
    let fine_report = analyzer.analyze_estimate(&estimate, &fine).unwrap();
    let coarse_again = analyzer.analyze_estimate(&estimate, &coarse).unwrap();

    assert_eq!(coarse_report.records.len(), 5);
    assert_eq!(fine_report.step_samples, 13);
    assert_eq!(coarse_report, coarse_again);
    assert_eq!(coarse_report, analyzer.analyze(&series, &coarse).unwrap());
}

#[test]
fn test_absolute_time_tracks_start_time() {
    let analyzer = VibrationAnalyzer::new();
    let mut series = series_at(10.0, 40);
    series.start_time = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap();

    let config = AnalysisConfig {
        window_seconds: 1.0,
        overlap_fraction: 0.0,
        ..Default::default()
    };
    let report = analyzer.analyze(&series, &config).unwrap();

    let last = report.records.last().unwrap();
    assert!((last.time - 3.9).abs() < 1e-9);
    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 1).unwrap()
        + chrono::Duration::milliseconds(900);
    assert!((last.absolute_time - expected).num_microseconds().unwrap().abs() <= 1);
}

#[test]
fn test_declared_rate_is_informational() {
    let analyzer = VibrationAnalyzer::new();
    let mut series = series_at(100.0, 400);
    let baseline = analyzer
        .analyze(&series, &AnalysisConfig::default())
        .unwrap();

    series.target_sample_rate = Some(400.0);
    series.max_device_sample_rate = Some(500.0);
    let declared = analyzer
        .analyze(&series, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(baseline, declared);
}

#[test]
fn test_bands_between_fft_bins_are_reported() {
    let analyzer = VibrationAnalyzer::new();
    let times = [
        0.014144, 0.03272, 0.047221, 0.063106, 0.079782, 0.096562, 0.114117, 0.130219,
        0.146348, 0.164231,
    ];
    let samples = times
        .iter()
        .enumerate()
        .map(|(i, &t)| Sample::new(t, 0.01 * i as f64, -0.02, 9.79 + 0.005 * (i % 3) as f64))
        .collect();
    let series = SampleSeries::new(samples, DateTime::<Utc>::default());
    let config = AnalysisConfig {
        window_seconds: 0.1,
        overlap_fraction: 0.0,
        ..Default::default()
    };

    let report = analyzer.analyze(&series, &config).unwrap();
    assert_eq!(report.window_size_samples, 6);

    // 8-point FFT: bins every ~7.5 Hz up to a ~30 Hz Nyquist
    let resolvable = [
        FrequencyBand::new(0, 1),
        FrequencyBand::new(5, 10),
        FrequencyBand::new(10, 20),
        FrequencyBand::new(20, 30),
    ];
    let expected: Vec<FrequencyBand> = STANDARD_BANDS
        .iter()
        .copied()
        .filter(|b| !resolvable.contains(b))
        .collect();
    assert_eq!(expected[0], FrequencyBand::new(1, 5));
    assert_eq!(report.unmeasurable_bands, expected);

    for record in &report.records {
        assert_eq!(record.get(MetricKind::Band(FrequencyBand::new(1, 5))), Some(0.0));
        assert!(record.get(MetricKind::Band(FrequencyBand::new(0, 1))).unwrap() > 0.0);
    }
}

#[test]
fn test_window_longer_than_any_series() {
    let analyzer = VibrationAnalyzer::new();
    let series = series_at(100.0, 300);
    let config = AnalysisConfig {
        window_seconds: 1e30,
        overlap_fraction: 0.9999999999999999,
        ..Default::default()
    };

    let report = analyzer.analyze(&series, &config).unwrap();

    assert_eq!(report.window_size_samples, usize::MAX);
    assert_eq!(report.records.len(), 300usize.div_ceil(report.step_samples));
    assert!(report.unmeasurable_bands.iter().all(|b| b.low_hz >= 50));
    let last_time = report.records[0].time;
    for record in &report.records {
        assert_eq!(record.values.len(), 17);
        assert_eq!(record.time, last_time);
    }
}

#[test]
fn test_start_time_near_end_of_calendar() {
    let analyzer = VibrationAnalyzer::new();
    let mut series = series_at(10.0, 40);
    series.start_time = DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(1);

    let config = AnalysisConfig {
        window_seconds: 1.0,
        overlap_fraction: 0.0,
        ..Default::default()
    };
    let report = analyzer.analyze(&series, &config).unwrap();

    assert_eq!(report.records.len(), 4);
    assert!(report.records[0].absolute_time < DateTime::<Utc>::MAX_UTC);
    assert_eq!(report.records[3].absolute_time, DateTime::<Utc>::MAX_UTC);
}
