/// Result alias that carries the custom [`WavVizError`] type.
pub type Result<T> = std::result::Result<T, WavVizError>;

/// Common error type for the core crate.
///
/// The first four variants cover the decode taxonomy; every one of them is
/// raised synchronously by a parsing entry point and is fatal to that decode
/// attempt. Playback never raises; a rejected `play` is an ordinary `false`.
#[derive(Debug, thiserror::Error)]
pub enum WavVizError {
    /// Bad magic bytes or invalid chunk structure.
    #[error("malformed container: {0}")]
    MalformedContainer(&'static str),
    /// Non-PCM format tag or a format sub-chunk that is not 16 bytes.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(&'static str),
    /// Fewer bytes available than a chunk declares or requires.
    #[error("truncated data: {0}")]
    TruncatedData(&'static str),
    /// Declared byte rate or block align disagrees with the derived value.
    #[error("inconsistent header: {0}")]
    InconsistentHeader(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around configuration parsing errors.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
