// file: src/utils/logging.rs
// description: tracing subscriber setup and colored status lines for the cli

use colored::*;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// HTTP client internals are noisy at debug level.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn log_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose { "debug" } else { "info" };
    QUIET_DEPENDENCIES
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(EnvFilter::new(level), |filter, directive| {
            filter.add_directive(directive)
        })
}

pub fn init_logger(colored_output: bool, verbose: bool) {
    colored::control::set_override(colored_output);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(colored_output);

    if let Err(e) = tracing_subscriber::registry()
        .with(log_filter(verbose))
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("logger already initialised: {}", e);
    }
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

/// Numbered question line as printed after generation.
pub fn format_question(number: usize, text: &str, regenerated: bool) -> String {
    let label = format!("{:>3}.", number).cyan().bold();
    if regenerated {
        format!("{} {} {}", label, text, "(new)".dimmed())
    } else {
        format!("{} {}", label, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_status_lines() {
        colored::control::set_override(false);
        assert_eq!(format_success("saved"), "✓ saved");
        assert_eq!(format_warning("old prompts"), "⚠ old prompts");
        assert_eq!(format_question(3, "Why?", false), "  3. Why?");
        assert_eq!(format_question(12, "How?", true), " 12. How? (new)");
    }

    #[test]
    fn test_verbose_filter() {
        let filter = log_filter(true).to_string();
        if std::env::var("RUST_LOG").is_err() {
            assert!(filter.contains("debug"));
            assert!(filter.contains("reqwest=warn"));
        }
    }
}
