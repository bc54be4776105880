//! 命令定义和实现

pub mod check;
pub mod init;
pub mod simulate;

pub use check::CheckCommand;
pub use init::InitCommand;
pub use simulate::SimulateCommand;
