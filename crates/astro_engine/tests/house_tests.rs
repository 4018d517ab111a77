use approx::assert_relative_eq;
use astro_engine::houses::{
    compute_houses, local_sidereal_time_hours, HouseCalculator, HouseError, HouseSystemKind,
};
use astro_engine::time::{to_julian_day, JulianDay};
use astro_engine::zodiac::normalize_degrees;

#[test]
fn test_ascendant_from_sidereal_time() {
    let jd = to_julian_day(1990, 7, 14, 6, 30, 0.0, 0.0).unwrap();
    let houses = compute_houses(jd, 40.7128, -74.006).unwrap();
    let lst = local_sidereal_time_hours(jd, -74.006);
    assert_relative_eq!(houses.local_sidereal_time, lst);
    assert_relative_eq!(houses.ascendant, normalize_degrees(lst * 15.0), epsilon = 1e-9);
    assert_relative_eq!(
        houses.midheaven,
        normalize_degrees(houses.ascendant + 90.0),
        epsilon = 1e-9
    );
}

#[test]
fn test_equal_cusps_spaced_thirty_degrees() {
    let houses = compute_houses(JulianDay::J2000, 51.5074, -0.1278).unwrap();
    assert_eq!(houses.cusps[0], houses.ascendant);
    for i in 0..12 {
        let expected = normalize_degrees(houses.ascendant + i as f64 * 30.0);
        assert_relative_eq!(houses.cusps[i], expected, epsilon = 1e-9);
        assert!((0.0..360.0).contains(&houses.cusps[i]));
    }
}

#[test]
fn test_whole_sign_cusps_on_sign_boundaries() {
    let calculator = HouseCalculator::for_kind(HouseSystemKind::WholeSign);
    let houses = calculator
        .compute_houses(JulianDay::J2000, 51.5074, -0.1278)
        .unwrap();
    assert_eq!(houses.system, HouseSystemKind::WholeSign);
    let first_sign_start = (houses.ascendant / 30.0).floor() * 30.0;
    assert_eq!(houses.cusps[0], first_sign_start);
    for cusp in houses.cusps {
        assert_eq!(cusp % 30.0, 0.0);
    }
    assert_eq!(houses.house_of(houses.ascendant), 1);
}

#[test]
fn test_house_of_stays_in_range() {
    let houses = compute_houses(JulianDay::new(2_460_000.25), -33.8688, 151.2093).unwrap();
    let mut longitude = -720.0;
    while longitude < 720.0 {
        let house = houses.house_of(longitude);
        assert!((1..=12).contains(&house), "{} -> {}", longitude, house);
        longitude += 3.7;
    }
}

#[test]
fn test_house_of_matches_formula() {
    let houses = compute_houses(JulianDay::new(2_455_000.0), 10.0, 20.0).unwrap();
    for longitude in [0.0, 45.5, 123.0, 222.2, 359.9] {
        let expected = (normalize_degrees(longitude - houses.ascendant) / 30.0).floor() as u8 + 1;
        assert_eq!(houses.house_of(longitude), expected);
    }
}

#[test]
fn test_pole_latitude_fails() {
    for latitude in [90.0, -90.0] {
        let result = compute_houses(JulianDay::J2000, latitude, 0.0);
        assert!(matches!(
            result,
            Err(HouseError::HouseCalculationFailed { .. })
        ));
    }
    assert!(compute_houses(JulianDay::J2000, 89.9, 0.0).is_ok());
}

#[test]
fn test_non_finite_input_fails() {
    assert!(compute_houses(JulianDay::new(f64::NAN), 0.0, 0.0).is_err());
    assert!(compute_houses(JulianDay::J2000, 0.0, f64::INFINITY).is_err());
    assert!(compute_houses(JulianDay::J2000, 0.0, 181.0).is_err());
}

#[test]
fn test_house_system_parse() {
    assert_eq!("equal".parse::<HouseSystemKind>(), Ok(HouseSystemKind::Equal));
    assert_eq!("WHOLE_SIGN".parse::<HouseSystemKind>(), Ok(HouseSystemKind::WholeSign));
    assert!("placidus".parse::<HouseSystemKind>().is_err());
}
