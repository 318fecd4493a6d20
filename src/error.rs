use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The host surface has not been laid out yet (or has collapsed to nothing).
    #[error("surface {width}x{height} has no drawable area")]
    UnmeasuredSurface { width: f32, height: f32 },

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown screen `{0}` (expected sign-in, sign-up or forgot-password)")]
    UnknownScreen(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
