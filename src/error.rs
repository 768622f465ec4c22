//! Error type shared by the resolver, serializers and storage backends.

use std::path::PathBuf;

use thiserror::Error;

use crate::serializer::Format;

/// Errors produced by settings resolution, storage and decoding.
///
/// "File does not exist" is deliberately absent: a missing settings file is
/// an ordinary empty result, never an error.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The host environment could not supply a local data directory.
    #[error("could not determine local data directory")]
    NoBaseDirectory,

    /// A settings directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a settings file failed.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be encoded or decoded.
    #[error("malformed {format} settings: {message}")]
    Serialization { format: Format, message: String },

    /// A structured value names a type missing from the registry.
    #[error("setting '{key}' has type '{kind}' which is not a known type")]
    UnknownType { key: String, kind: String },

    /// A structured value does not match the shape of its registered type.
    #[error("setting '{key}' does not match registered type '{kind}': {source}")]
    TypeMismatch {
        key: String,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// A float setting is NaN or infinite, which no document format preserves.
    #[error("setting '{key}' is not a finite number")]
    NonFiniteFloat { key: String },

    /// The stored document failed to load, so saving would overwrite it.
    #[error("settings failed to load, refusing to overwrite the stored document")]
    LoadFailed,

    /// A background I/O task panicked or was cancelled.
    #[error("settings I/O task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
