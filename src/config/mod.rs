//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize into FileConfig)
//!     → profile selection (explicit > TRIPWIRE_PROFILE > file > "development")
//!     → validation.rs (semantic checks)
//!     → Config (resolved, immutable apart from the descriptor cursor)
//!     → owned by the dispatch coordinator for the rest of the process
//! ```
//!
//! # Design Decisions
//! - Config is built lazily, once; a failed build is never retried
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod object;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use object::{Config, Settings};
pub use schema::{FileConfig, NotifierDescriptor, ProfileConfig};
pub use source::{ConfigSource, FileSource, FnSource};
pub use validation::ValidationError;
