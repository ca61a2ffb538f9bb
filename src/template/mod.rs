//! Template acquisition: download a branch archive, then unpack it
//! under the requested plugin name

pub mod fetch;
pub mod install;

pub use fetch::{ArchiveFetcher, HttpArchiveFetcher};
pub use install::{extract_zip, install_archive};
