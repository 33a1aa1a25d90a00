pub mod distance;
pub mod sequencer;
pub mod stops;

pub use distance::*;
pub use sequencer::*;
pub use stops::*;
