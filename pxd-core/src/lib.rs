//! Canvas, history, color and protocol codecs for the `pxd` pixel-editing
//! daemon. This crate has no knowledge of sockets, processes, or signals —
//! that belongs to the `pxd` binary crate.

pub mod canvas;
pub mod color;
pub mod error;
pub mod history;
pub mod protocol;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
