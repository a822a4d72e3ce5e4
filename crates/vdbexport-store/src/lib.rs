// ABOUTME: Tree storage for vdbexport: an in-memory tree session, fixture loading, and manifest mirroring.
// ABOUTME: Lets the exporter run without an external content repository.

pub mod fixture;
pub mod memory;
pub mod mirror;

pub use fixture::{FixtureDocument, FixtureError, FixtureNode, FixtureValue, Scalar, load_fixture};
pub use memory::{MemoryTree, ROOT_TYPE, StoreError, path_segment};
pub use mirror::mirror_manifest;
