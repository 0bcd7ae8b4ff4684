//! Routing reports to the services that receive them.
//!
//! Also carries the router's configuration file and its tracing setup.

pub mod config;
pub mod logging;
pub mod routing;

pub use config::{ConfigError, LoggingSection, RouterConfig};
pub use logging::{LogConfig, LogFormat, LoggingError, init_logging, init_logging_with_writer};
pub use routing::{RoutedReport, filter_and_map_by_service, route_to_all};
