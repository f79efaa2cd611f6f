use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("hand needs exactly {expected} landmarks, got {actual}")]
    HandPointCount { expected: usize, actual: usize },
    #[error("face needs at least {required} landmarks, got {actual}")]
    FacePointCount { required: usize, actual: usize },
    #[error("landmark {index} is not a finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("high score file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("sprite directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
