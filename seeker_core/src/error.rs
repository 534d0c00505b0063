use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TargetingError {
    #[error("vision error: {0}")]
    Vision(String),
    #[error("vision sensor fault: {0}")]
    VisionFault(String),
    #[error("drive error: {0}")]
    Drive(String),
    #[error("illuminator error: {0}")]
    Illuminator(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing vision source")]
    MissingVision,
    #[error("missing drive actuator")]
    MissingDrive,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
