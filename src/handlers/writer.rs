//! Handler writing encoded events to any `io::Write`

use crate::core::{
    CloseState, Event, FormatterConfig, Handler, Level, LoggerError, OutputFormat, Result,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Encodes each event on one line and writes it under a mutex.
///
/// Concurrent writers never interleave within a line. No ordering is
/// promised between events from different threads.
pub struct WriterHandler<W: Write + Send> {
    writer: Mutex<W>,
    threshold: Level,
    format: OutputFormat,
    config: Arc<FormatterConfig>,
    state: CloseState,
}

impl<W: Write + Send> WriterHandler<W> {
    pub fn new(writer: W, threshold: Level) -> Self {
        Self {
            writer: Mutex::new(writer),
            threshold,
            format: OutputFormat::default(),
            config: FormatterConfig::default().shared(),
            state: CloseState::new(),
        }
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_formatter_config(mut self, config: Arc<FormatterConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Run `f` against the underlying writer while holding the lock
    pub fn with_writer<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.writer.lock())
    }
}

impl WriterHandler<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed
    ///
    /// ```no_run
    /// use structured_log_core::handlers::WriterHandler;
    /// use structured_log_core::{Level, OutputFormat};
    ///
    /// let handler = WriterHandler::open("/var/log/app.log", Level::INFO)
    ///     .unwrap()
    ///     .with_output_format(OutputFormat::Json);
    /// ```
    pub fn open(path: impl AsRef<Path>, threshold: Level) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file), threshold))
    }
}

impl<W: Write + Send> Handler for WriterHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    fn write(&self, event: &Event) -> Result<()> {
        self.state.ensure_open()?;
        let mut line = self.format.format(event, &self.config);
        line.push('\n');
        self.writer
            .lock()
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::handler_write(self.name(), e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.state.ensure_open()?;
        self.writer.lock().flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.state.close()?;
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "writer"
    }
}

impl<W: Write + Send> Drop for WriterHandler<W> {
    fn drop(&mut self) {
        if !self.state.is_closed() {
            let _ = self.writer.get_mut().flush();
        }
    }
}
