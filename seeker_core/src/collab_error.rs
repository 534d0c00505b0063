//! Maps `Box<dyn Error>` from collaborator boundaries to typed `TargetingError`.
//!
//! With the `sim-errors` feature the simulator's `SimError` is downcast and
//! mapped precisely; anything else goes through string heuristics.

use crate::error::TargetingError;

/// Which collaborator call produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Vision,
    Drive,
    Illuminator,
}

/// Map a trait-boundary error to a typed `TargetingError`.
pub fn map_collab_error(boundary: Boundary, e: &(dyn std::error::Error + 'static)) -> TargetingError {
    #[cfg(feature = "sim-errors")]
    {
        use seeker_sim::error::SimError;
        if let Some(sim) = e.downcast_ref::<SimError>() {
            return match sim {
                SimError::SensorFault(_) => TargetingError::VisionFault(sim.to_string()),
                SimError::DriveFault(_) => TargetingError::Drive(sim.to_string()),
            };
        }
    }

    let s = e.to_string();
    match boundary {
        Boundary::Vision => {
            let lower = s.to_lowercase();
            if lower.contains("timeout") || lower.contains("disconnect") {
                TargetingError::VisionFault(s)
            } else {
                TargetingError::Vision(s)
            }
        }
        Boundary::Drive => TargetingError::Drive(s),
        Boundary::Illuminator => TargetingError::Illuminator(s),
    }
}
