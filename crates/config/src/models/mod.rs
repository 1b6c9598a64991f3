pub mod api_observability;
pub mod app_config;
pub mod database;
pub mod dispatcher;
pub mod sender;

pub use api_observability::*;
pub use app_config::*;
pub use database::*;
pub use dispatcher::*;
pub use sender::*;
