//! Command modules for the pipeline metrics CLI.
//!
//! - `config_cmd`: configuration file management
//! - `dashboard_cmd`: summary and trend dashboard generation
//! - `handle_event_cmd`: handling a single execution event

pub mod config_cmd;
pub mod dashboard_cmd;
pub mod handle_event_cmd;
