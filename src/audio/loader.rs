//! Background decoding so the frame loop never blocks on a file.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::decode::{decode_bytes, decode_file, DecodedAudio};
use crate::error::AudioError;

type DecodeResult = Result<DecodedAudio, AudioError>;

/// A decode running on a worker thread
pub struct PendingAudio {
    source: String,
    receiver: Receiver<DecodeResult>,
}

impl PendingAudio {
    /// Start decoding a file
    pub fn from_path(path: PathBuf) -> Self {
        let source = path.display().to_string();
        Self::spawn(source, move || decode_file(&path))
    }

    /// Start decoding an in-memory file
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<String>) -> Self {
        let source = format!("<{} bytes>", bytes.len());
        Self::spawn(source, move || decode_bytes(bytes, extension.as_deref()))
    }

    fn spawn<F>(source: String, decode: F) -> Self
    where
        F: FnOnce() -> DecodeResult + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may be gone if a newer load replaced this one
            let _ = sender.send(decode());
        });
        log::info!("Decoding audio from {}", source);
        Self { source, receiver }
    }

    /// Human-readable origin (path or byte count)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Non-blocking check. `None` while the worker is still decoding.
    pub fn poll(&self) -> Option<DecodeResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AudioError::WorkerGone)),
        }
    }

    /// Block until the worker reports
    pub fn wait(self) -> DecodeResult {
        self.receiver.recv().unwrap_or(Err(AudioError::WorkerGone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_error() {
        let pending = PendingAudio::from_path(PathBuf::from("/nonexistent/song.mp3"));
        assert!(pending.source().contains("song.mp3"));
        assert!(matches!(pending.wait(), Err(AudioError::Io(_))));
    }

    #[test]
    fn test_garbage_bytes_report_error() {
        let pending = PendingAudio::from_bytes(vec![0u8; 64], Some("ogg".to_string()));
        assert!(pending.wait().is_err());
    }
}
