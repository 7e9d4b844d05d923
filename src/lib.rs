pub mod configuration;
pub mod dynasty;
pub mod error;
pub mod fetch_client;
pub mod models;
pub mod run;

pub use configuration::Settings;
pub use error::Error;
pub use models::Cli;
pub use run::run;
