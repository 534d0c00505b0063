//! Simulated collaborators for the targeting controller.
//!
//! - `ReplayVision` plays back recorded telemetry.
//! - `SimPlant` closes the loop: corrections move the simulated target.
//! - `TankDrive` maps corrections to left/right wheel outputs.

pub mod drive;
pub mod error;
pub mod illuminator;
pub mod plant;
pub mod replay;

pub use drive::{RecordingWheels, TankDrive, WheelOutput};
pub use error::SimError;
pub use illuminator::{Illuminator, LedState};
pub use plant::{PlantDrive, PlantVision, SimPlant};
pub use replay::ReplayVision;
