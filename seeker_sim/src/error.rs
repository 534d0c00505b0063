use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulated sensor fault: {0}")]
    SensorFault(String),
    #[error("drive fault: {0}")]
    DriveFault(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
