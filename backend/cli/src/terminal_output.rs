//! Terminal output for the CLI: status lines, config reports, and the
//! two-column listings printed by `samples` and `classify --summary`.

use std::io::IsTerminal;

use propscope_config::ValidationReport;

const RESET: &str = "\x1b[0m";

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Ok,
    Warn,
    Error,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Info => "\x1b[36m",
            Tone::Ok => "\x1b[32m",
            Tone::Warn => "\x1b[33m",
            Tone::Error => "\x1b[31m",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tone::Info => "info",
            Tone::Ok => "ok",
            Tone::Warn => "warn",
            Tone::Error => "error",
        }
    }
}

/// Color only for an interactive stdout, and never with `NO_COLOR` set.
fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn styled(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}{RESET}")
    } else {
        s.to_string()
    }
}

fn status_line(enabled: bool, tone: Tone, msg: &str) -> String {
    let label = format!("{:>5}", tone.label());
    format!("{} {msg}", styled(enabled, tone.ansi(), &label))
}

/// Print one status line. Errors go to stderr.
pub fn say(tone: Tone, msg: &str) {
    let line = status_line(color_enabled(), tone, msg);
    if tone == Tone::Error {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Print every warning and error in a config report, keyed by field path.
pub fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        say(Tone::Warn, &format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        say(Tone::Error, &format!("{}: {}", error.path, error.message));
    }
}

pub fn bold(s: &str) -> String {
    styled(color_enabled(), "\x1b[1m", s)
}

/// Red, for risk flags that came back `true`.
pub fn alert(s: &str) -> String {
    styled(color_enabled(), Tone::Error.ansi(), s)
}

/// Width as the terminal shows it, skipping `ESC [ ... m` sequences.
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

/// Left column padded to its widest cell; the right column is left ragged.
pub fn two_columns(headers: (&str, &str), rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(left, _)| visible_width(left))
        .chain(std::iter::once(headers.0.len()))
        .max()
        .unwrap_or(0);

    let line = |left: &str, right: &str| {
        let pad = " ".repeat(width - visible_width(left));
        format!("  {left}{pad}  {right}\n")
    };

    let mut out = line(&bold(headers.0), &bold(headers.1));
    for (left, right) in rows {
        out.push_str(&line(left, right));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_color_codes() {
        assert_eq!(visible_width(&styled(true, "\x1b[31m", "fireHazards")), 11);
        assert_eq!(visible_width("plain"), 5);
    }

    #[test]
    fn columns_line_up_with_colored_cells() {
        let rows = vec![
            ("garden.jpg".to_string(), "image/jpeg".to_string()),
            (styled(true, "\x1b[31m", "a.jpg"), "image/jpeg".to_string()),
        ];
        let table = two_columns(("Sample", "Type"), &rows);
        let offsets: Vec<usize> = table
            .lines()
            .skip(1)
            .map(|l| {
                let prefix = &l[..l.find("image/jpeg").unwrap()];
                visible_width(prefix)
            })
            .collect();
        assert_eq!(offsets[0], offsets[1]);
    }

    #[test]
    fn status_line_without_color_is_plain() {
        assert_eq!(status_line(false, Tone::Warn, "port 80"), " warn port 80");
        assert!(status_line(true, Tone::Ok, "ready").contains("\x1b[32m"));
    }
}
