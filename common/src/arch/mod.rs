//! Architecture selection.
//!
//! The board target is AArch64. Every other target (the host running the
//! unit tests) gets stand-ins with the same names that keep the ordering
//! guarantees but touch no system registers.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        pub mod aarch64;
        pub use aarch64::*;
        pub use aarch64::irq::Aarch64Irq as CpuIrq;
    } else {
        pub mod host;
        pub use host::*;
        pub use host::HostIrq as CpuIrq;
    }
}
