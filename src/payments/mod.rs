pub mod error;
pub mod gateway;
pub mod stripe;
pub mod types;
pub mod utils;
