/// Error taxonomy for the simulation and its inputs.
///
/// Blocked moves are not errors: they are dropped and reported as events.
/// Everything here is either a malformed input (message or config file)
/// or a map the retry loops could not satisfy within their bounds.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("message is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded message is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("no map with a walkable cell at ({x}, {y}) after {attempts} attempts")]
    MapUnsatisfiable { x: i32, y: i32, attempts: u32 },

    #[error("map has no walkable cell")]
    NoWalkableCell,

    #[error("could not read {}: {source}", .path.display())]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("invalid {}: {source}", .path.display())]
    ConfigParse { path: PathBuf, source: toml::de::Error },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
