use approx::assert_relative_eq;
use astro_engine::time::{datetime_to_julian_day, to_julian_day, JulianDay, TimeError};
use chrono::{TimeZone, Utc};

#[test]
fn test_j2000_exact() {
    let jd = to_julian_day(2000, 1, 1, 12, 0, 0.0, 0.0).unwrap();
    assert_eq!(jd.value(), 2_451_545.0);
}

#[test]
fn test_offset_is_subtracted() {
    // 14:00 local at UTC+2 is noon UT
    let jd = to_julian_day(2000, 1, 1, 14, 0, 0.0, 2.0).unwrap();
    assert_eq!(jd.value(), 2_451_545.0);

    // 07:00 local at UTC-5 is noon UT
    let jd = to_julian_day(2000, 1, 1, 7, 0, 0.0, -5.0).unwrap();
    assert_eq!(jd.value(), 2_451_545.0);
}

#[test]
fn test_offset_crossing_midnight() {
    // 01:30 on Jan 2 at UTC+3 is 22:30 UT on Jan 1
    let jd = to_julian_day(2000, 1, 2, 1, 30, 0.0, 3.0).unwrap();
    let expected = to_julian_day(2000, 1, 1, 22, 30, 0.0, 0.0).unwrap();
    assert_relative_eq!(jd.value(), expected.value(), epsilon = 1e-9);
}

#[test]
fn test_known_dates() {
    // Unix epoch
    let jd = to_julian_day(1970, 1, 1, 0, 0, 0.0, 0.0).unwrap();
    assert_eq!(jd.value(), 2_440_587.5);
    // Gregorian reform, proleptic
    let jd = to_julian_day(1582, 10, 15, 12, 0, 0.0, 0.0).unwrap();
    assert_eq!(jd.value(), 2_299_161.0);
}

#[test]
fn test_leap_day() {
    assert!(to_julian_day(2024, 2, 29, 0, 0, 0.0, 0.0).is_ok());
    assert_eq!(
        to_julian_day(2023, 2, 29, 0, 0, 0.0, 0.0),
        Err(TimeError::InvalidDate {
            field: "day",
            value: "29".to_string()
        })
    );
    assert!(to_julian_day(1900, 2, 29, 0, 0, 0.0, 0.0).is_err());
}

#[test]
fn test_invalid_components() {
    assert!(matches!(
        to_julian_day(2000, 13, 1, 0, 0, 0.0, 0.0),
        Err(TimeError::InvalidDate { field: "month", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 0, 1, 0, 0, 0.0, 0.0),
        Err(TimeError::InvalidDate { field: "month", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 4, 31, 0, 0, 0.0, 0.0),
        Err(TimeError::InvalidDate { field: "day", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 1, 1, 24, 0, 0.0, 0.0),
        Err(TimeError::InvalidDate { field: "hour", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 1, 1, 0, 60, 0.0, 0.0),
        Err(TimeError::InvalidDate { field: "minute", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 1, 1, 0, 0, 60.0, 0.0),
        Err(TimeError::InvalidDate { field: "second", .. })
    ));
    assert!(matches!(
        to_julian_day(2000, 1, 1, 0, 0, 0.0, 25.0),
        Err(TimeError::InvalidOffset { .. })
    ));
}

#[test]
fn test_datetime_paths_agree() {
    let dt = Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0)
        .single()
        .unwrap();
    let calendar = datetime_to_julian_day(dt);
    let epoch = JulianDay::from_datetime(dt);
    assert_relative_eq!(calendar.value(), epoch.value(), epsilon = 1e-8);
    assert_relative_eq!(calendar.value(), 2_446_896.306_25, epsilon = 1e-8);
}

#[test]
fn test_to_datetime_inverse() {
    let dt = Utc.with_ymd_and_hms(2024, 6, 21, 8, 45, 30)
        .single()
        .unwrap();
    let jd = JulianDay::from_datetime(dt);
    assert_eq!(jd.to_datetime(), Some(dt));
    assert_eq!(JulianDay::new(f64::NAN).to_datetime(), None);
}

#[test]
fn test_centuries_since_j2000() {
    assert_eq!(JulianDay::J2000.centuries_since_j2000(), 0.0);
    assert_relative_eq!(
        JulianDay::new(2_451_545.0 + 36_525.0).centuries_since_j2000(),
        1.0
    );
}
