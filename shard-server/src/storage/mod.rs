//! Upload storage for Shard.
//!
//! Uploaded CSV files are kept on disk under a single root directory. The
//! stored filename is the only state that travels between the upload and the
//! visualize request, so every lookup is resolved strictly inside the root.

mod uploads;

pub use uploads::{StorageError, UploadStorage};
