use colored::{control, Colorize};

use crate::core::models::cost::Report;

/// Render a report for the terminal.
///
/// Layout:
/// ```text
///  Billing report (Unblended)
///   Account   123456789012
///   Period    2024-03-01 ~ 2024-03-14
///   Total     $123.45
///   Services:
///     AWS Lambda  5.00
///     Amazon S3   10.00
/// ```
pub fn render_report(report: &Report, currency_symbol: &str, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    let header = format!(" Billing report ({})", report.total.metric.display_name());
    lines.push(header.bold().to_string());

    let account = if report.account_id.is_empty() {
        "unknown".dimmed().to_string()
    } else {
        report.account_id.clone()
    };
    lines.push(format!("  {}   {}", "Account".cyan(), account));
    lines.push(format!(
        "  {}    {} ~ {}",
        "Period".cyan(),
        report.period.start,
        report.period.end
    ));
    lines.push(format!(
        "  {}     {}",
        "Total".cyan(),
        format!("{}{}", currency_symbol, report.total.amount).bold()
    ));

    if report.services.is_empty() {
        lines.push(format!("  {}  {}", "Services".cyan(), "none".dimmed()));
    } else {
        lines.push(format!("  {}:", "Services".cyan()));
        let width = report
            .services
            .iter()
            .map(|e| e.service_name.chars().count())
            .max()
            .unwrap_or(0);
        for entry in &report.services {
            lines.push(format!(
                "    {:<width$}  {}",
                entry.service_name,
                entry.amount,
                width = width
            ));
        }
    }

    lines.join("\n")
}
