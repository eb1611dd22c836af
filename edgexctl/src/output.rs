//! Command output sink
//!
//! Every handler writes through an [`Output`], which owns the [`PagerWriter`]
//! and knows whether request URLs or whole HTTP responses should be shown
//! alongside the formatted result.

use anyhow::Result;
use colored::*;
use std::io::Write;

use crate::client::{Exchange, Reply};
use crate::format::OutputFormat;
use crate::pager::PagerWriter;

/// Destination and presentation settings for command output
#[derive(Debug)]
pub struct Output {
    writer: PagerWriter,
    format: OutputFormat,
    show_urls: bool,
    verbose: bool,
}

impl Output {
    pub fn new(writer: PagerWriter, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            show_urls: false,
            verbose: false,
        }
    }

    /// Print the method and URL of each request
    pub fn with_urls(mut self, show_urls: bool) -> Self {
        self.show_urls = show_urls;
        self
    }

    /// Print status, headers and body of each response
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write one line of text.
    pub fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.writer, "{}", text.as_ref())?;
        Ok(())
    }

    /// Write the request details the flags ask for.
    pub fn exchange(&mut self, exchange: &Exchange) -> Result<()> {
        if self.show_urls || self.verbose {
            writeln!(
                self.writer,
                "{} {}",
                exchange.method.to_string().bold(),
                exchange.url
            )?;
        }

        if self.verbose {
            let status = exchange.status.to_string();
            let status = if exchange.status.is_success() {
                status.green()
            } else {
                status.red()
            };
            writeln!(self.writer, "{} {}", "Status:".bold(), status)?;
            for (name, value) in &exchange.headers {
                writeln!(
                    self.writer,
                    "{}: {}",
                    name.as_str().dimmed(),
                    value.to_str().unwrap_or("<binary>")
                )?;
            }
            writeln!(self.writer)?;
            writeln!(self.writer, "{}", exchange.body)?;
            writeln!(self.writer)?;
        }

        Ok(())
    }

    /// Write the exchange details followed by the rendered data.
    pub fn reply<T>(
        &mut self,
        reply: &Reply<T>,
        render: impl FnOnce(&T, &OutputFormat) -> Result<String>,
    ) -> Result<()> {
        self.exchange(&reply.exchange)?;
        let rendered = render(&reply.data, &self.format)?;
        self.line(rendered)
    }

    /// Flush and wait for the pager.
    pub fn close(&mut self) -> Result<()> {
        Ok(self.writer.close()?)
    }
}
