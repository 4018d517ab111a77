pub mod builder;
pub mod types;

pub use builder::ChartBuilder;
pub use types::{
    BirthChart, BirthInput, ChartBackend, ChartError, ChartOutcome, ChartPlanet, ChartWarning,
    GeoLocation, House,
};
