//! `config` loads the runtime settings of the courier from a TOML file
mod types;
pub use types::{validate, CommonError, ToValidate};

mod profile;
pub use profile::ProfileConfig;

mod zkp;
pub use zkp::ZkpConfig;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;
