pub mod accessibility;
pub mod device_catalog;
pub mod device_resolver;
pub mod device_tools;
pub mod outcome;
pub mod preference;
pub mod server;
pub mod ui_query;
pub mod ui_tools;
