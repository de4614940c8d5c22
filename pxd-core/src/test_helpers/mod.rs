//! Test-only helpers shared by `pxd-core` and the `pxd` binary crate.

mod mock_stream;

pub use mock_stream::MockStream;
