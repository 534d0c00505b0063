#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Vision-guided target acquisition (hardware-agnostic).
//!
//! Every frame from a `seeker_traits::VisionSource` is pushed into fixed-size
//! sample windows. The controller works on the window medians, never on a raw
//! frame, and emits at most one single-axis correction per tick to a
//! `seeker_traits::DriveActuator`.
//!
//! ## Architecture
//!
//! - **Windows**: FIFO sample windows with median and mode (`window`)
//! - **Target state**: presence debounce, convergence streaks, heading latch (`state`)
//! - **Normalizer**: raw offset to shaped percentage (`normalize`)
//! - **Correction law**: depth, then rotation, then lateral (`law`)
//! - **Tunables**: live preference-backed gains, sanitized on read (`tunables`)
//! - **Lifecycle**: `Controller` start/tick/stop (`controller`), built via `builder`
//! - **Runner**: fixed-rate scheduler with a shutdown flag (`runner`)

pub mod builder;
pub mod collab_error;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod law;
pub mod normalize;
pub mod runner;
pub mod state;
pub mod status;
pub mod tunables;
pub mod window;

pub use builder::{
    ControllerBuilder, DynController, MAX_WINDOW_FRAMES, Missing, Set, SharedPreferences,
    build_controller,
};
pub use collab_error::{Boundary, map_collab_error};
pub use config::{AxisMask, Bounds, ControllerSettings, TargetingCfg, TunableDefaults};
pub use controller::Controller;
pub use error::{BuildError, Report, Result, TargetingError};
pub use normalize::{normalize_offset, normalize_offsets};
pub use runner::{RunOutcome, RunParams, RunSummary, run};
pub use state::TargetState;
pub use status::{Phase, Termination, TickReport, TickStatus};
pub use tunables::Tunables;
pub use window::{OffsetWindow, PresenceWindow};
