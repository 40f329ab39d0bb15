//! Command handlers module.
//!
//! - `core.rs`: list commands (show, append, insert, add-list, add-node,
//!   delete, status, backup)
//! - `config.rs`: configuration display command

mod config;
mod core;

pub use config::cmd_config;
pub use core::{
    cmd_add_list, cmd_add_node, cmd_append, cmd_backup, cmd_delete, cmd_insert, cmd_show,
    cmd_status,
};
