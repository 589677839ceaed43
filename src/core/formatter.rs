use crate::core::config::NotifySettings;
use crate::core::error::{ReportError, ReportResult};
use crate::core::models::cost::{Report, ServiceCostSummary, TotalCost};
use crate::core::models::message::ChatMessage;

/// Returns one `"<service> :  <amount>\n"` line per entry, in summary order.
/// An empty summary yields an empty string.
pub fn format_service_lines(services: &ServiceCostSummary) -> String {
    services
        .iter()
        .map(|entry| format!("{} :  {}\n", entry.service_name, entry.amount))
        .collect()
}

/// Returns the report text. Amounts are copied verbatim; the service block is
/// fenced as a code block so chat clients render it in a fixed-width font.
pub fn format_report(
    account_id: &str,
    total: &TotalCost,
    services: &ServiceCostSummary,
    currency_symbol: &str,
) -> String {
    format!(
        "Account ID: {} \n {} ~ {} total charges: {}{}\nCost by service:\n ```{}```",
        account_id,
        total.period.start,
        total.period.end,
        currency_symbol,
        total.amount,
        format_service_lines(services),
    )
}

/// Wrap a report in the webhook envelope.
pub fn build_message(report: &Report, notify: &NotifySettings) -> ReportResult<ChatMessage> {
    check_report(report)?;
    Ok(ChatMessage {
        text: format_report(
            &report.account_id,
            &report.total,
            &report.services,
            &notify.currency_symbol,
        ),
        color: notify.color.clone(),
        username: notify.username.clone(),
        icon_emoji: notify.icon_emoji.clone(),
    })
}

/// The aggregator and period resolver guarantee these; a violation is a bug
/// and the message must not go out.
fn check_report(report: &Report) -> ReportResult<()> {
    if report.period.start > report.period.end {
        return Err(ReportError::Format(format!(
            "period starts after it ends ({} > {})",
            report.period.start, report.period.end
        )));
    }
    if let Some(pair) = report
        .services
        .windows(2)
        .find(|w| w[0].service_name >= w[1].service_name)
    {
        return Err(ReportError::Format(format!(
            "services out of order: '{}' before '{}'",
            pair[0].service_name, pair[1].service_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::cost::ServiceCostEntry;
    use crate::core::models::metric::CostMetric;
    use crate::core::period::BillingPeriod;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn march_total() -> TotalCost {
        TotalCost {
            period: BillingPeriod {
                start: date("2024-03-01"),
                end: date("2024-03-31"),
            },
            amount: "123.45".to_string(),
            metric: CostMetric::Unblended,
        }
    }

    fn entry(name: &str, amount: &str) -> ServiceCostEntry {
        ServiceCostEntry {
            service_name: name.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn service_lines_follow_summary_order() {
        let services = vec![entry("Amazon S3", "10.00"), entry("AWS Lambda", "5.00")];
        assert_eq!(
            format_service_lines(&services),
            "Amazon S3 :  10.00\nAWS Lambda :  5.00\n"
        );
    }

    #[test]
    fn service_lines_empty() {
        assert_eq!(format_service_lines(&Vec::new()), "");
    }

    #[test]
    fn report_contains_account_period_total_and_services() {
        let services = vec![entry("Amazon S3", "10.00"), entry("AWS Lambda", "5.00")];
        let text = format_report("123456789012", &march_total(), &services, "$");

        assert!(text.starts_with("Account ID: 123456789012 \n"));
        assert!(text.contains("2024-03-01 ~ 2024-03-31"));
        assert!(text.contains("$123.45"));
        let s3 = text.find("Amazon S3 :  10.00").unwrap();
        let lambda = text.find("AWS Lambda :  5.00").unwrap();
        assert!(s3 < lambda);
        assert!(text.ends_with("AWS Lambda :  5.00\n```"));
    }

    #[test]
    fn report_exact_layout() {
        let services = vec![entry("Amazon S3", "10.00")];
        let text = format_report("123456789012", &march_total(), &services, "$");
        assert_eq!(
            text,
            "Account ID: 123456789012 \n 2024-03-01 ~ 2024-03-31 total charges: $123.45\n\
             Cost by service:\n ```Amazon S3 :  10.00\n```"
        );
    }

    #[test]
    fn report_with_no_services_has_empty_block() {
        let text = format_report("123456789012", &march_total(), &Vec::new(), "$");
        assert!(text.ends_with("``````"));
    }

    #[test]
    fn report_is_idempotent() {
        let services = vec![entry("Amazon S3", "10.00"), entry("AWS Lambda", "5.00")];
        let first = format_report("123456789012", &march_total(), &services, "$");
        let second = format_report("123456789012", &march_total(), &services, "$");
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn amounts_are_not_reformatted() {
        let mut total = march_total();
        total.amount = "1234567.8912345".to_string();
        let services = vec![entry("Tax", "0.0000000001")];
        let text = format_report("", &total, &services, "$");
        assert!(text.contains("$1234567.8912345"));
        assert!(text.contains("Tax :  0.0000000001"));
    }

    #[test]
    fn empty_account_id_still_formats() {
        let text = format_report("", &march_total(), &Vec::new(), "$");
        assert!(text.starts_with("Account ID:  \n"));
    }

    #[test]
    fn build_message_uses_notify_settings() {
        let report = Report::new(
            "123456789012".to_string(),
            march_total(),
            vec![entry("AWS Lambda", "5.00"), entry("Amazon S3", "10.00")],
        );
        let notify = NotifySettings {
            currency_symbol: "USD ".to_string(),
            ..NotifySettings::default()
        };

        let message = build_message(&report, &notify).unwrap();
        assert_eq!(message.username, "aws-cost-and-usage-report (webhook)");
        assert_eq!(message.icon_emoji, ":aws-cost-and-usage-report:");
        assert_eq!(message.color, "good");
        assert!(message.text.contains("USD 123.45"));
    }

    #[test]
    fn message_serializes_to_webhook_envelope() {
        let report = Report::new("1".to_string(), march_total(), Vec::new());
        let message = build_message(&report, &NotifySettings::default()).unwrap();
        let json: serde_json::Value = serde_json::to_value(&message).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 4);
        for key in ["text", "color", "username", "icon_emoji"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn build_message_rejects_unsorted_services() {
        let report = Report::new(
            "1".to_string(),
            march_total(),
            vec![entry("Amazon S3", "10.00"), entry("AWS Lambda", "5.00")],
        );
        let err = build_message(&report, &NotifySettings::default()).unwrap_err();
        assert!(matches!(err, ReportError::Format(_)));
    }

    #[test]
    fn build_message_rejects_duplicate_services() {
        let report = Report::new(
            "1".to_string(),
            march_total(),
            vec![entry("Amazon S3", "10.00"), entry("Amazon S3", "11.00")],
        );
        assert!(build_message(&report, &NotifySettings::default()).is_err());
    }

    #[test]
    fn build_message_rejects_inverted_period() {
        let mut total = march_total();
        total.period = BillingPeriod {
            start: date("2024-03-31"),
            end: date("2024-03-01"),
        };
        let report = Report::new("1".to_string(), total, Vec::new());
        let err = build_message(&report, &NotifySettings::default()).unwrap_err();
        assert!(err.to_string().contains("starts after it ends"));
    }
}
