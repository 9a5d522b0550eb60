//! Orrery core: installation environment, data-area paths, versioned-filename
//! resolution, and the kernel database refresh algorithm.

pub mod datadir;
pub mod environment;
pub mod kerneldb;
pub mod versioned;

pub use datadir::{DataArea, DataAreaError};
pub use environment::EnvironmentError;
pub use kerneldb::{refresh_kernel_db, KernelDbError};
pub use versioned::{VersionError, VersionedPath};
