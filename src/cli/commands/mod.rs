//! One module per subcommand.

pub mod add;
pub mod config_cmd;
pub mod delete;
pub mod export;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod passwd;
pub mod show;
pub mod update;
