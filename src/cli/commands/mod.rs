mod init;
mod sweep;

pub use init::cmd_init;
pub use sweep::cmd_sweep;
