//! Console handler with colored level names

use crate::core::{
    CloseState, Event, FormatterConfig, Handler, Level, OutputFormat, Result,
};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Writes events to stdout, and events at [`Level::ERROR`] or above to stderr.
pub struct ConsoleHandler {
    threshold: Level,
    use_colors: bool,
    format: OutputFormat,
    config: Arc<FormatterConfig>,
    state: CloseState,
}

impl ConsoleHandler {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            use_colors: true,
            format: OutputFormat::default(),
            config: FormatterConfig::default().shared(),
            state: CloseState::new(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the output format
    ///
    /// ```
    /// use structured_log_core::handlers::ConsoleHandler;
    /// use structured_log_core::{Level, OutputFormat};
    ///
    /// let handler = ConsoleHandler::new(Level::INFO).with_output_format(OutputFormat::Logfmt);
    /// ```
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

    /// Render one event as it would appear on the terminal
    pub fn render(&self, event: &Event) -> String {
        if self.format != OutputFormat::Text || !self.use_colors || !self.config.include_level {
            return self.format.format(event, &self.config);
        }

        let body_config = FormatterConfig {
            include_timestamp: false,
            include_level: false,
            ..(*self.config).clone()
        };
        let level = format!("[{}]", self.config.level_text(event.level()))
            .color(event.level().color_code())
            .to_string();
        let body = OutputFormat::Text.format(event, &body_config);

        if self.config.include_timestamp {
            format!(
                "[{}] {} {}",
                self.config.timestamp_format.format(&event.time()),
                level,
                body
            )
        } else {
            format!("{} {}", level, body)
        }
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Handler for ConsoleHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    fn write(&self, event: &Event) -> Result<()> {
        self.state.ensure_open()?;
        let line = self.render(event);
        if event.level() >= Level::ERROR {
            writeln!(std::io::stderr().lock(), "{}", line)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", line)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.state.ensure_open()?;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.state.close()?;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
