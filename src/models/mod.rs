pub mod bounding_box;
pub mod crs;
pub mod extent;
pub mod request;
pub mod run_id;
pub mod simulation;
pub mod stop;

pub use bounding_box::{BoundingBox, BoundingBoxError};
pub use crs::{Crs, ProjectionError};
pub use extent::Extent;
pub use request::{SimulationForm, SimulationRequest};
pub use run_id::{RunId, RunIdGenerator};
pub use simulation::{DistanceBin, SimulationResult};
pub use stop::{BoundaryVertex, StaticDataset, Stop};
