//! Error types for the library seams.

use thiserror::Error;

/// Failures while decoding or playing an audio source
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("no decodable audio track found")]
    NoTrack,

    #[error("audio contains no samples")]
    Empty,

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("invalid analyser config: {0}")]
    Config(String),

    #[error("audio decoder worker stopped before reporting")]
    WorkerGone,
}

/// Failures while setting up the GPU surface
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface configuration unsupported by adapter")]
    UnsupportedSurface,
}
