//! Error types for knob-id

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// knob-id error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration is present but unusable
    #[error("Config error: {0}")]
    Config(String),

    /// Bus transfer with the inertial sensor failed
    #[error("Bus error: {0}")]
    Bus(String),

    /// Presence signal could not be read; the pipeline cannot continue
    #[error("Presence signal error: {0}")]
    Presence(String),

    /// Record could not be persisted
    #[error("Record error: {0}")]
    Record(String),

    /// Device type not known to this build
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an `embedded-hal` I2C error as a bus error
    pub fn bus<E: embedded_hal::i2c::Error>(err: E) -> Self {
        Error::Bus(format!("{:?}", err.kind()))
    }
}
