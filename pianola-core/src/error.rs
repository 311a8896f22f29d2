//! Error types for generation, configuration and playback.

/// Failure reported by a device sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The sink was closed or never connected
    NotConnected,
    /// No MIDI output ports are available
    NoPorts,
    /// Requested port index does not exist
    PortOutOfRange { index: usize, available: usize },
    /// No port name matched the requested pattern
    PortNotFound(String),
    /// The MIDI backend could not be initialized
    Init(String),
    /// Opening the port failed
    Connect(String),
    /// Sending a message failed
    Send(String),
    /// Note id or velocity outside 0-127
    OutOfRange { what: &'static str, value: i32 },
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "device not connected"),
            Self::NoPorts => write!(f, "no MIDI output ports available"),
            Self::PortOutOfRange { index, available } => {
                write!(f, "invalid port index {} ({} available)", index, available)
            }
            Self::PortNotFound(name) => write!(f, "no MIDI output port matching '{}'", name),
            Self::Init(e) => write!(f, "MIDI init failed: {}", e),
            Self::Connect(e) => write!(f, "MIDI connect failed: {}", e),
            Self::Send(e) => write!(f, "MIDI send failed: {}", e),
            Self::OutOfRange { what, value } => write!(f, "{} {} outside 0-127", what, value),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Error type for everything pianola-core does.
#[derive(Debug)]
pub enum Error {
    /// Unknown scale id, malformed tables, start pitch outside the scale
    InvalidConfiguration(String),
    /// Caller-supplied value out of range
    InvalidArgument(String),
    /// Internal invariant broken (e.g. degree outside the scale)
    InvalidState(String),
    /// The device sink rejected a call
    Device(DeviceError),
    Io(std::io::Error),
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::InvalidConfiguration(format!("malformed config: {}", e))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Self::Device(e) => write!(f, "device error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
