use thiserror::Error;

/// Errors raised while reading or writing segment files.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entry encode/decode failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Corrupt segment: {0}")]
    Corrupt(String),

    #[error("Key out of order: {0}")]
    OutOfOrderKey(String),

    #[error("Key filter build failed: {0}")]
    FilterBuild(String),
}

/// Errors raised by a running merge unit. All of them are fatal to the
/// merge; nothing is retried locally.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Segment error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Hibernation snapshot failed: {0}")]
    Snapshot(String),

    #[error("Merge unit shut down before completion")]
    Aborted,

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Merge unit is gone: {0}")]
    UnitGone(String),
}
