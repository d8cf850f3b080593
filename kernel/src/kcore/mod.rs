//! Kernel core: boot-time initialization.

pub mod init;
