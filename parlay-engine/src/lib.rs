pub mod analysis;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod lineup;
pub mod models;
pub mod props;
pub mod sampler;
pub mod sports;

pub use config::EnsembleConfig;
pub use error::PredictError;
