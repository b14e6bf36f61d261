use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallistoError {
    #[error("invalid cut levels: lo {lo} exceeds hi {hi}")]
    InvalidCutLevels { lo: f32, hi: f32 },

    #[error("no valid pixels in data")]
    NoValidPixels,

    #[error(
        "unknown auto-cut method '{0}' (expected one of: minmax, median, stddev, histogram, zscale)"
    )]
    UnknownAutoCutMethod(String),

    #[error(
        "unknown color distribution '{0}' (expected one of: linear, log, power, sqrt, squared, asinh, sinh, histeq)"
    )]
    UnknownDistribution(String),

    #[error("unknown color map '{name}' (registered: {registered})")]
    UnknownColorMap { name: String, registered: String },

    #[error("unknown intensity map '{name}' (registered: {registered})")]
    UnknownIntensityMap { name: String, registered: String },

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("mode '{0}' is already registered")]
    DuplicateMode(String),

    #[error("activation key '{key}' is already bound to mode '{mode}'")]
    DuplicateActivationKey { key: String, mode: String },

    #[error("invalid binding trigger '{trigger}': {reason}")]
    InvalidTrigger { trigger: String, reason: String },

    #[error("invalid zoom rate {0} (must be greater than 1)")]
    InvalidZoomRate(f64),

    #[error("invalid scale limits [{min}, {max}]: min must be positive and below max")]
    InvalidScaleLimits { min: f64, max: f64 },

    #[error("no world coordinate backend attached")]
    NoWorldCoords,

    #[error("coordinate conversion failed: {0}")]
    Coordinate(String),
}

pub type Result<T> = std::result::Result<T, CallistoError>;
