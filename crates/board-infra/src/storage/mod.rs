//! File transfer implementations.

mod local;

pub use local::LocalFileTransfer;
