use crate::aspects::AspectDetector;
use crate::bodies::{Body, CHART_BODIES};
use crate::chart::types::{
    BirthChart, BirthInput, ChartBackend, ChartError, ChartOutcome, ChartPlanet, ChartWarning,
    House,
};
use crate::ephemeris::{Backend, EphemerisProvider, PlanetPosition};
use crate::houses::{HouseCalculator, HouseSystemKind};
use crate::time::to_julian_day;
use crate::zodiac::ZodiacSign;
use std::sync::Arc;

/// Builds natal charts against one ephemeris provider.
#[derive(Clone)]
pub struct ChartBuilder {
    provider: Arc<dyn EphemerisProvider>,
    houses: HouseCalculator,
    detector: AspectDetector,
    bodies: Vec<Body>,
}

impl ChartBuilder {
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            provider,
            houses: HouseCalculator::default(),
            detector: AspectDetector::default(),
            bodies: CHART_BODIES.to_vec(),
        }
    }

    pub fn with_house_system(mut self, kind: HouseSystemKind) -> Self {
        self.houses = HouseCalculator::for_kind(kind);
        self
    }

    pub fn with_house_calculator(mut self, houses: HouseCalculator) -> Self {
        self.houses = houses;
        self
    }

    pub fn with_detector(mut self, detector: AspectDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_bodies(mut self, bodies: &[Body]) -> Self {
        self.bodies = bodies.to_vec();
        self
    }

    /// Track Chiron in addition to the default bodies.
    pub fn with_chiron(mut self, include: bool) -> Self {
        self.bodies.retain(|b| *b != Body::Chiron);
        if include {
            self.bodies.push(Body::Chiron);
        }
        self
    }

    pub fn provider(&self) -> &Arc<dyn EphemerisProvider> {
        &self.provider
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Compute a natal chart.
    ///
    /// Missing non-essential bodies become warnings on a partial chart; a missing Sun
    /// or Moon, or failed houses, abort the whole build.
    pub async fn build_chart(&self, input: &BirthInput) -> Result<ChartOutcome, ChartError> {
        validate_location(input)?;

        let julian_day = to_julian_day(
            input.year,
            input.month,
            input.day,
            input.hour,
            input.minute,
            input.second,
            input.timezone_offset_hours,
        )?;

        let mut warnings = Vec::new();
        let mut positions: Vec<PlanetPosition> = Vec::with_capacity(self.bodies.len());
        for (body, result) in self.provider.positions_of(&self.bodies, julian_day).await {
            match result {
                Ok(position) => positions.push(position),
                Err(e) if body.is_essential() => {
                    return Err(ChartError::ChartBuildFailed {
                        reason: format!("{} could not be resolved: {}", body.display_name(), e),
                    });
                }
                Err(e) => {
                    log::warn!("Omitting {} from chart: {}", body, e);
                    warnings.push(ChartWarning::BodyOmitted {
                        body,
                        reason: e.to_string(),
                    });
                }
            }
        }
        for essential in [Body::Sun, Body::Moon] {
            if !positions.iter().any(|p| p.body == essential) {
                return Err(ChartError::ChartBuildFailed {
                    reason: format!("{} is not tracked", essential.display_name()),
                });
            }
        }

        let cusps = self
            .houses
            .compute_houses(julian_day, input.latitude, input.longitude)?;

        let planets: Vec<ChartPlanet> = positions
            .iter()
            .map(|position| ChartPlanet {
                sign: position.sign(),
                house: cusps.house_of(position.longitude),
                position: position.clone(),
            })
            .collect();

        let houses = cusps
            .cusps
            .iter()
            .enumerate()
            .map(|(i, &cusp)| House {
                number: i as u8 + 1,
                cusp,
                sign: ZodiacSign::from_longitude(cusp),
            })
            .collect();

        let aspects = self.detector.scan(&positions);

        let degraded: Vec<Body> = positions
            .iter()
            .filter(|p| p.backend == Backend::Analytic)
            .map(|p| p.body)
            .collect();
        if self.provider.preferred_backend() == Backend::Precise && !degraded.is_empty() {
            log::warn!(
                "Chart built with reduced precision for {} bodies",
                degraded.len()
            );
            warnings.push(ChartWarning::DegradedPrecision { bodies: degraded });
        }

        let backend = ChartBackend::summarize(positions.iter().map(|p| p.backend));
        log::debug!(
            "Chart built for JD {} via {} ({:?}): {} planets, {} aspects, {} warnings",
            julian_day.value(),
            self.provider.name(),
            backend,
            planets.len(),
            aspects.len(),
            warnings.len()
        );

        Ok(ChartOutcome {
            chart: BirthChart {
                input: input.clone(),
                julian_day,
                location: input.location(),
                house_system: cusps.system,
                ascendant: cusps.ascendant,
                midheaven: cusps.midheaven,
                planets,
                houses,
                aspects,
                backend,
            },
            warnings,
        })
    }
}

fn validate_location(input: &BirthInput) -> Result<(), ChartError> {
    let valid = input.latitude.is_finite()
        && input.longitude.is_finite()
        && (-90.0..=90.0).contains(&input.latitude)
        && (-180.0..=180.0).contains(&input.longitude);
    if valid {
        Ok(())
    } else {
        Err(ChartError::InvalidLocation {
            latitude: input.latitude,
            longitude: input.longitude,
        })
    }
}
