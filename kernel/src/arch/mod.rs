//! Architecture support. The kernel only runs on AArch64.

pub mod aarch64;
