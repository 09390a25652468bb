//! Configuration manager façade
//!
//! Split across focused files: construction and registration in `core`,
//! reads/writes/validation in `operations`, persistence and export/import in
//! `io`, and the profile API in `profiles`.

mod core;
mod io;
mod operations;
mod profiles;

pub use core::{ConfigurationManager, ManagerConfig, ManagerConfigBuilder};
pub use io::ExportDocument;
pub use operations::SetOptions;
