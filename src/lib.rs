//! Edge service that turns a client address into local time, location and
//! current weather.

pub mod address;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geo_location;
pub mod server;
pub mod timezone;
pub mod weather;

pub use config::Config;
pub use error::AppError;
