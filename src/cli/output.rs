use colored::Colorize;
use std::fmt;
use std::io::{self, Write};

use crate::config::Theme;

/// Message categories used by the shell output helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
    /// Unlabelled body text, such as field rows.
    Detail,
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[✓]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Section | MessageKind::Detail => ("", ""),
    }
}

pub(crate) fn apply_style(kind: MessageKind, message: impl fmt::Display, theme: Theme) -> String {
    let text = message.to_string();

    let formatted = match kind {
        MessageKind::Section => {
            let title = text.trim();
            format!("=== {title} ===")
        }
        MessageKind::Detail => text,
        _ => {
            let (label, icon) = build_label(kind);
            format!("{label}: {icon} {text}")
        }
    };

    match (theme, kind) {
        (Theme::Plain, _) | (_, MessageKind::Info) | (_, MessageKind::Detail) => formatted,
        (_, MessageKind::Section) => formatted.bold().to_string(),
        (Theme::Light, MessageKind::Success) => formatted.green().to_string(),
        (Theme::Light, MessageKind::Warning) => formatted.yellow().to_string(),
        (Theme::Light, MessageKind::Error) => formatted.red().to_string(),
        (Theme::Dark, MessageKind::Success) => formatted.bright_green().to_string(),
        (Theme::Dark, MessageKind::Warning) => formatted.bright_yellow().to_string(),
        (Theme::Dark, MessageKind::Error) => formatted.bright_red().to_string(),
    }
}

/// Writes themed messages to any output stream.
pub struct Printer<W: Write> {
    out: W,
    theme: Theme,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, theme: Theme) -> Self {
        Self { out, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn print(&mut self, kind: MessageKind, message: impl fmt::Display) -> io::Result<()> {
        let formatted = apply_style(kind, message, self.theme);
        match kind {
            MessageKind::Section => writeln!(self.out, "\n{formatted}"),
            _ => writeln!(self.out, "{formatted}"),
        }
    }

    pub fn info(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Info, message)
    }

    pub fn success(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Success, message)
    }

    pub fn warning(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Warning, message)
    }

    pub fn error(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Error, message)
    }

    pub fn section(&mut self, title: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Section, title)
    }

    pub fn detail(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Detail, message)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_emits_labels_without_escape_codes() {
        assert_eq!(
            apply_style(MessageKind::Error, "email: Invalid email format", Theme::Plain),
            "ERROR: [x] email: Invalid email format"
        );
        assert_eq!(
            apply_style(MessageKind::Section, " Sign up ", Theme::Plain),
            "=== Sign up ==="
        );
        assert_eq!(apply_style(MessageKind::Detail, "  row", Theme::Dark), "  row");
    }

    #[test]
    fn printer_writes_one_line_per_message() {
        let mut printer = Printer::new(Vec::new(), Theme::Plain);
        printer.info("hello").unwrap();
        printer.warning("careful").unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(text, "INFO: [i] hello\nWARNING: [!] careful\n");
    }

    #[test]
    fn theme_can_change_between_messages() {
        let mut printer = Printer::new(Vec::new(), Theme::Dark);
        assert_eq!(printer.theme(), Theme::Dark);
        printer.set_theme(Theme::Plain);
        assert_eq!(printer.theme(), Theme::Plain);
        printer.success("saved").unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(text, "SUCCESS: [✓] saved\n");
    }
}
