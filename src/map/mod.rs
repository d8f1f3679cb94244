pub mod geometry;
mod globe;
pub mod palette;
mod renderer;
mod spatial;

pub use globe::{Camera, GlobeViewport, PointOfView};
pub use renderer::{GlobeLayers, GlobeRenderer, PolygonClick};
pub use spatial::CountryIndex;
