use std::fmt;
use std::io::{self, BufWriter, LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::error::LoggerError;
use crate::domain::models::settings::RotationPolicy;

/// File name prefix for rolling log files
pub const LOG_FILE_PREFIX: &str = "bootkit";

/// Shared, lock-protected output stream
///
/// Every handle derived from one logger writes through the same `Sink`.
/// Each record is written with a single `write_all` while the lock is held,
/// so concurrent records never interleave.
#[derive(Clone)]
pub struct Sink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    /// Wrap an arbitrary writer
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Line-buffered standard error
    pub fn stderr() -> Self {
        Self::new(Box::new(LineWriter::new(io::stderr())))
    }

    /// Buffered rolling file `bootkit[.<period>].log` in `dir`
    pub fn rolling(dir: &Path, rotation: RotationPolicy) -> Result<Self, LoggerError> {
        let rotation = match rotation {
            RotationPolicy::Daily => Rotation::DAILY,
            RotationPolicy::Hourly => Rotation::HOURLY,
            RotationPolicy::Never => Rotation::NEVER,
        };

        let appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .build(dir)
            .map_err(|e| {
                LoggerError::Build(format!(
                    "failed to open log directory {}: {e}",
                    dir.display()
                ))
            })?;

        Ok(Self::new(Box::new(BufWriter::new(appender))))
    }

    /// Flush buffered output to the underlying stream
    pub fn flush(&self) -> io::Result<()> {
        self.lock()?.flush()
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log sink lock poisoned"))
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Self::flush(self)
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}
