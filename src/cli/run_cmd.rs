use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::formatter;
use crate::core::job::{self, Delivery, ReportJob};
use crate::core::models::cost::Report;
use crate::core::models::message::ChatMessage;
use crate::core::services::cost_explorer::CostExplorerBilling;
use crate::core::services::parameter_store::SsmParameterStore;
use crate::core::services::sts::StsIdentity;
use crate::core::services::webhook::SlackWebhook;
use crate::core::services::load_aws_config;

#[derive(Serialize)]
struct PreviewPayload<'a> {
    report: &'a Report,
    message: &'a ChatMessage,
}

/// Build the report and post it to the webhook.
pub async fn run(config: &AppConfig, today: NaiveDate, opts: &OutputOptions) -> Result<()> {
    let settings = config.job_settings()?;
    let aws = load_aws_config(&config.billing.region).await;

    let billing = CostExplorerBilling::new(&aws);
    let identity = StsIdentity::new(&aws);
    let secrets = SsmParameterStore::new(&aws);
    let sink = SlackWebhook::new()?;

    tracing::info!(
        %today,
        metric = settings.metric.api_name(),
        region = %config.billing.region,
        "starting billing report"
    );

    let report_job = ReportJob {
        billing: &billing,
        identity: &identity,
        settings,
    };
    let delivery = Delivery {
        secrets: &secrets,
        sink: &sink,
        notify: &config.notify,
    };

    let report = job::run(&report_job, &delivery, today)
        .await
        .context("Billing report failed")?;

    match opts.format {
        OutputFormat::Text => {
            println!(
                "Posted {} report for {} ~ {} ({} services)",
                report.total.metric.display_name(),
                report.period.start,
                report.period.end,
                report.services.len()
            );
        }
        OutputFormat::Json => println!("{}", opts.to_json(&report)?),
    }

    Ok(())
}

/// Build the report and print it without touching the parameter store or
/// the webhook.
pub async fn preview(config: &AppConfig, today: NaiveDate, opts: &OutputOptions) -> Result<()> {
    let settings = config.job_settings()?;
    let aws = load_aws_config(&config.billing.region).await;

    let billing = CostExplorerBilling::new(&aws);
    let identity = StsIdentity::new(&aws);
    let report_job = ReportJob {
        billing: &billing,
        identity: &identity,
        settings,
    };

    let report = report_job
        .build_report(today)
        .await
        .context("Failed to build billing report")?;
    let message = formatter::build_message(&report, &config.notify)?;

    match opts.format {
        OutputFormat::Text => {
            println!(
                "{}",
                renderer::render_report(&report, &config.notify.currency_symbol, opts.use_color)
            );
            println!();
            println!("{}", message.text);
        }
        OutputFormat::Json => {
            let payload = PreviewPayload {
                report: &report,
                message: &message,
            };
            println!("{}", opts.to_json(&payload)?);
        }
    }

    Ok(())
}
