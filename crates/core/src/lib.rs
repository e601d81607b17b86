pub mod alert;
pub mod config;
pub mod credential;
pub mod error;
pub mod feed;

pub use alert::*;
pub use config::Config;
pub use error::*;
pub use feed::*;
