pub mod analytic;
pub mod hybrid;
pub mod swiss;
pub mod types;

pub use analytic::{AnalyticProvider, RetrogradeMode};
pub use hybrid::HybridProvider;
pub use swiss::{resolve_ephemeris_path, PreciseProvider};
pub use types::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
