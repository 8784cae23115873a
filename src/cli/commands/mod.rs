mod backfill;
mod config;
mod user;

pub use backfill::cmd_backfill;
pub use config::{cmd_config_init, cmd_config_show};
pub use user::{cmd_user_add, cmd_user_api_key, cmd_user_passwd};
