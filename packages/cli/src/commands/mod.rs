pub mod compile;
pub mod init;
pub mod tokens;
pub mod watch;

pub use compile::{compile, CompileArgs};
pub use init::{init, InitArgs};
pub use tokens::{tokens, TokensArgs};
pub use watch::{watch, WatchArgs};
