//! `log` sink on the serial console.

use core::fmt::Write;

use common::arch::CpuIrq;
use common::sync::IrqSpinLock;
use drivers::hal::serial::SerialWriter;
use drivers::peripheral::pl011::Pl011;
use drivers::{Mmio, SerialPort};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Most verbose level that reaches the console.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

type Console = SerialWriter<Pl011<Mmio>>;

struct KernelLogger {
    console: IrqSpinLock<Option<Console>, CpuIrq>,
}

static LOGGER: KernelLogger = KernelLogger {
    console: IrqSpinLock::new(None),
};

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= LOG_LEVEL
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(console) = self.console.lock().as_mut() {
            let _ = writeln!(
                console,
                "[{:<5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Some(console) = self.console.lock().as_mut() {
            console.0.flush();
        }
    }
}

/// Route `log` output to `uart`. Only the first call installs the logger.
pub fn init(uart: Pl011<Mmio>) -> Result<(), SetLoggerError> {
    *LOGGER.console.lock() = Some(SerialWriter(uart));
    log::set_logger(&LOGGER)?;
    log::set_max_level(LOG_LEVEL);
    Ok(())
}
