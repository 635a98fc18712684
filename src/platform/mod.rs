
pub mod memory;
pub mod notifier;
pub mod sensor;

pub use memory::{MemoryHost, MemorySurface, SurfaceProbe, SurfaceState};
pub use notifier::LogNotifier;
pub use sensor::{NoSensor, PositionSubscription, SimulatedSensor};
