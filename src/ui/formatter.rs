//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! The `format_*` functions build strings and are testable; the `display_*` functions print them.

use console::style;

use crate::domain::{Module, Reactor};
use crate::rewrite::RewriteReport;
use crate::warnings::RewriteWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a rewrite warning to the user.
pub fn display_warning(warning: &RewriteWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One reactor entry: `groupId:artifactId:version (descriptor)`.
pub fn format_module(module: &Module) -> String {
    format!(
        "{}:{} ({})",
        module.key,
        module.version,
        module.descriptor.display()
    )
}

/// Display the reactor in build order.
///
/// # Arguments
/// * `reactor` - The modules named by the release plan
pub fn display_reactor(reactor: &Reactor) {
    println!("{}", style("Reactor build order:").bold());
    for (i, module) in reactor.iter().enumerate() {
        println!("  {}. {}", i + 1, format_module(module));
    }
}

/// One-line summary of a rewrite run.
pub fn format_report_summary(report: &RewriteReport) -> String {
    let action = if report.simulated {
        "Simulated"
    } else {
        "Rewrote"
    };
    let noun = if report.written.len() == 1 {
        "descriptor"
    } else {
        "descriptors"
    };
    format!(
        "{} {} {} for {} ({} snapshot properties, {} warnings)",
        action,
        report.written.len(),
        noun,
        report.mode,
        report.properties,
        report.warnings.len()
    )
}

/// Display the outcome of a rewrite run.
///
/// Lists every written file, then the warnings collected along the way.
pub fn display_report(report: &RewriteReport) {
    for path in &report.written {
        println!("  {}", style(path.display()).cyan());
    }
    for warning in &report.warnings {
        display_warning(warning);
    }
    display_success(&format_report_summary(report));
}
