use anyhow::Result;
use genquakeml::config::Config;
use genquakeml::error::GenQuakemlError;
use genquakeml::pipeline::output::OutputFormat;
use genquakeml::pipeline::run_conversion;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

const REFERENCE_EVENT: &str = "\
# Hunter Valley test event
eventid = ga2021abc
depth = 10
latitude = -32.1
longitude = 151.2
magnitude = 4.5
magnitude_type = ML
event_type = earthquake
eventsource = ga
dataid = ga2021abc
datasource = ga
";

fn write_input(contents: &str) -> Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let input = dir.path().join("event.txt");
    fs::write(&input, contents)?;
    Ok((dir, input))
}

#[test]
fn test_reference_event_produces_quakeml() -> Result<()> {
    let (dir, input) = write_input(REFERENCE_EVENT)?;

    let result = run_conversion(&input, None, None, &Config::default())?;
    assert_eq!(result.output_file, dir.path().join("ga2021abc.xml"));

    let xml = fs::read_to_string(&result.output_file)?;
    assert!(xml.contains("xmlns:catalog=\"http://anss.org/xmlns/catalog/0.1\""));
    assert!(xml.contains("catalog:eventsource=\"ga\""));
    assert!(xml.contains("catalog:dataid=\"ga2021abc\""));
    assert!(xml.contains("catalog:eventid=\"ga2021abc\""));
    assert!(xml.contains("catalog:datasource=\"ga\""));
    assert!(xml.contains("<value>10000</value>"));
    assert!(xml.contains("<value>-32.1</value>"));
    assert!(xml.contains("<value>151.2</value>"));
    assert!(xml.contains("<value>4.5</value>"));
    assert!(xml.contains("<type>ML</type>"));
    assert!(xml.contains("<type>earthquake</type>"));
    Ok(())
}

#[test]
fn test_missing_depth_writes_nothing() -> Result<()> {
    let (dir, input) = write_input(&REFERENCE_EVENT.replace("depth = 10\n", ""))?;

    let err = run_conversion(&input, None, None, &Config::default()).unwrap_err();
    assert!(matches!(err, GenQuakemlError::Validation { .. }));
    assert_eq!(err.field(), Some("depth"));
    assert!(!dir.path().join("ga2021abc.xml").exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_categorical_case_does_not_change_output() -> Result<()> {
    let config = Config::default();
    let (_lower_dir, lower_input) = write_input(REFERENCE_EVENT)?;
    let (_upper_dir, upper_input) =
        write_input(&REFERENCE_EVENT.replace("event_type = earthquake", "event_type = EARTHQUAKE"))?;

    let lower = fs::read_to_string(run_conversion(&lower_input, None, None, &config)?.output_file)?;
    let upper = fs::read_to_string(run_conversion(&upper_input, None, None, &config)?.output_file)?;

    // creation times differ between runs; compare everything else
    let strip = |xml: &str| -> String {
        xml.lines()
            .filter(|line| !line.contains("<creationTime>"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&lower), strip(&upper));
    Ok(())
}

#[test]
fn test_picks_and_origin_time_round_through() -> Result<()> {
    let contents = format!(
        "{}date = 2021-06-24\ntime = 09:27:12.5\n\
pick1_network = AU\npick1_station = CNB\npick1_channel = BHZ\n\
pick1_time = 2021-06-24T09:27:30Z\npick1_phase = P\npick1_onset = IMPULSIVE\n\
pick1_station_latitude = -35.32\npick1_station_longitude = 149.0\n",
        REFERENCE_EVENT
    );
    let (_dir, input) = write_input(&contents)?;

    let result = run_conversion(&input, None, None, &Config::default())?;
    assert_eq!(result.pick_count, 1);

    let xml = fs::read_to_string(&result.output_file)?;
    assert!(xml.contains("<value>2021-06-24T09:27:12.500000Z</value>"));
    assert!(xml.contains("<onset>impulsive</onset>"));
    assert!(xml.contains("<pickID>smi:ga.gov.au/pick/ga2021abc/1</pickID>"));
    Ok(())
}

#[test]
fn test_sample_file_carries_quality_and_uncertainties() -> Result<()> {
    let sample = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/ga2021abc.txt");
    let dir = tempdir()?;
    let output = dir.path().join("ga2021abc.xml");

    let result = run_conversion(&sample, Some(&output), None, &Config::default())?;
    assert_eq!(result.pick_count, 2);

    let xml = fs::read_to_string(&output)?;
    assert!(xml.contains("<azimuthalGap>214</azimuthalGap>"));
    assert!(xml.contains("<usedPhaseCount>2</usedPhaseCount>"));
    assert!(xml.contains("<usedStationCount>2</usedStationCount>"));
    assert!(xml.contains("<associatedPhaseCount>2</associatedPhaseCount>"));
    assert!(xml.contains("<horizontalUncertainty>3200</horizontalUncertainty>"));
    assert!(xml.contains("<uncertainty>2500</uncertainty>"));
    assert!(xml.contains("<uncertainty>0.4</uncertainty>"));
    assert!(xml.contains("<depthType>from location</depthType>"));
    assert!(xml.contains("<evaluationMode>manual</evaluationMode>"));
    assert!(xml.contains("<evaluationStatus>reviewed</evaluationStatus>"));
    assert!(xml.contains("<stationCount>2</stationCount>"));
    assert!(xml.contains("<text>Hunter Valley, NSW</text>"));
    Ok(())
}

#[test]
fn test_byte_order_mark_input_converts() -> Result<()> {
    let (dir, input) = write_input(&format!("\u{feff}{}", REFERENCE_EVENT))?;

    let result = run_conversion(&input, None, None, &Config::default())?;
    assert_eq!(result.output_file, dir.path().join("ga2021abc.xml"));
    assert!(fs::read_to_string(&result.output_file)?.contains("catalog:eventid=\"ga2021abc\""));
    Ok(())
}

#[test]
fn test_sc3ml_output_to_explicit_path() -> Result<()> {
    let (dir, input) = write_input(REFERENCE_EVENT)?;
    let output = dir.path().join("event.sc3ml");

    let result = run_conversion(&input, Some(&output), Some(OutputFormat::Sc3ml), &Config::default())?;
    assert_eq!(result.output_file, output);
    assert_eq!(result.format, "SC3ML");

    let xml = fs::read_to_string(&output)?;
    assert!(xml.contains("<seiscomp"));
    assert!(!xml.contains("catalog:eventsource"));
    Ok(())
}

#[test]
fn test_malformed_line_reports_line_number() -> Result<()> {
    let (_dir, input) = write_input("eventid = ga2021abc\nthis line has no delimiter\n")?;

    let err = run_conversion(&input, None, None, &Config::default()).unwrap_err();
    match err {
        GenQuakemlError::Parse { line_number, .. } => assert_eq!(line_number, 2),
        other => panic!("expected a parse error, got {other}"),
    }
    Ok(())
}

#[test]
fn test_missing_input_file() {
    let err = run_conversion(
        &PathBuf::from("/nonexistent/event.txt"),
        None,
        None,
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GenQuakemlError::File { .. }));
}
