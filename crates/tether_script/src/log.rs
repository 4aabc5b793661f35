//! Script-facing logging
//!
//! Messages go through the engine's diagnostic channel, so they show up
//! wherever the engine routes its own output. `fatal` asks the engine to
//! stop; nothing here recovers from it.

use tether_core::native::LogCalls;
use tether_core::Severity;

pub struct Log;

impl Log {
    pub fn write(engine: &(impl LogCalls + ?Sized), severity: Severity, message: impl AsRef<str>) {
        engine.log(severity, message.as_ref());
    }

    pub fn verbose(engine: &(impl LogCalls + ?Sized), message: impl AsRef<str>) {
        Self::write(engine, Severity::Verbose, message);
    }

    pub fn info(engine: &(impl LogCalls + ?Sized), message: impl AsRef<str>) {
        Self::write(engine, Severity::Info, message);
    }

    pub fn warning(engine: &(impl LogCalls + ?Sized), message: impl AsRef<str>) {
        Self::write(engine, Severity::Warning, message);
    }

    pub fn error(engine: &(impl LogCalls + ?Sized), message: impl AsRef<str>) {
        Self::write(engine, Severity::Error, message);
    }

    pub fn fatal(engine: &(impl LogCalls + ?Sized), message: impl AsRef<str>) {
        Self::write(engine, Severity::Fatal, message);
    }
}
