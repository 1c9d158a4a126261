pub mod fs_atomic;
pub mod logging;
pub mod serde_ext;
