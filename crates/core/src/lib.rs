pub mod config;
pub mod entry;
pub mod entry_type;
pub mod error;

pub use config::Config;
pub use entry::*;
pub use entry_type::*;
pub use error::*;
