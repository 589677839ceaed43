use chrono::NaiveDate;

use crate::core::aggregator;
use crate::core::config::{IdentityPolicy, JobSettings, NotifySettings};
use crate::core::error::ReportResult;
use crate::core::formatter;
use crate::core::models::cost::Report;
use crate::core::models::message::ChatMessage;
use crate::core::period::ReportWindows;
use crate::core::services::{BillingQueryService, IdentityService, MessageSink, SecretStore};

/// Builds a report from the billing and identity collaborators.
pub struct ReportJob<'a> {
    pub billing: &'a dyn BillingQueryService,
    pub identity: &'a dyn IdentityService,
    pub settings: JobSettings,
}

impl ReportJob<'_> {
    pub async fn build_report(&self, today: NaiveDate) -> ReportResult<Report> {
        let windows = ReportWindows::resolve(today, self.settings.offsets);
        let costs = aggregator::aggregate(self.billing, &windows, self.settings.metric).await?;
        let account_id = resolve_account_id(self.identity, self.settings.identity_policy).await?;
        Ok(Report::new(account_id, costs.total, costs.services))
    }
}

/// Look up the account id. Under [`IdentityPolicy::Lenient`] a failure is
/// logged and the report goes out with an empty account id.
pub async fn resolve_account_id(
    identity: &dyn IdentityService,
    policy: IdentityPolicy,
) -> ReportResult<String> {
    match identity.account_id().await {
        Ok(id) => Ok(id),
        Err(e) if policy == IdentityPolicy::Lenient => {
            tracing::warn!(error = %e, "account id lookup failed, continuing without it");
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}

/// Sends a finished report to the chat webhook.
pub struct Delivery<'a> {
    pub secrets: &'a dyn SecretStore,
    pub sink: &'a dyn MessageSink,
    pub notify: &'a NotifySettings,
}

impl Delivery<'_> {
    /// Format the report, fetch the webhook URL and post. Returns the message
    /// that was delivered.
    pub async fn send(&self, report: &Report) -> ReportResult<ChatMessage> {
        let message = formatter::build_message(report, self.notify)?;
        let webhook_url = self.secrets.get_secret(&self.notify.webhook_parameter).await?;
        self.sink.post(&webhook_url, &message).await?;
        Ok(message)
    }
}

/// One full invocation: build the report, then deliver it. Nothing is posted
/// unless every step before delivery succeeded.
pub async fn run(
    job: &ReportJob<'_>,
    delivery: &Delivery<'_>,
    today: NaiveDate,
) -> ReportResult<Report> {
    let report = job.build_report(today).await?;
    delivery.send(&report).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReportError;
    use crate::core::models::metric::CostMetric;
    use crate::core::period::BoundaryOffsets;
    use crate::core::services::{CostBucket, CostQuery, CostResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeBilling {
        fail_total: bool,
        groups: Vec<(String, String)>,
    }

    #[async_trait]
    impl BillingQueryService for FakeBilling {
        async fn get_cost(&self, query: &CostQuery) -> ReportResult<CostResponse> {
            if query.group_by_service {
                return Ok(CostResponse {
                    buckets: vec![CostBucket {
                        total: None,
                        groups: self.groups.clone(),
                    }],
                });
            }
            if self.fail_total {
                return Err(ReportError::upstream("Cost Explorer", "AccessDeniedException"));
            }
            Ok(CostResponse {
                buckets: vec![CostBucket {
                    total: Some("123.45".to_string()),
                    groups: Vec::new(),
                }],
            })
        }
    }

    struct FakeIdentity(Option<&'static str>);

    #[async_trait]
    impl IdentityService for FakeIdentity {
        async fn account_id(&self) -> ReportResult<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ReportError::upstream("STS", "ExpiredToken"))
        }
    }

    struct FakeSecrets(Option<&'static str>);

    #[async_trait]
    impl SecretStore for FakeSecrets {
        async fn get_secret(&self, name: &str) -> ReportResult<String> {
            assert_eq!(name, "NotifyAwsBillingToSlack.WebHookUrl");
            self.0
                .map(str::to_string)
                .ok_or_else(|| ReportError::upstream("SSM Parameter Store", "ParameterNotFound"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        posted: Mutex<Vec<(String, ChatMessage)>>,
    }

    impl RecordingSink {
        fn posted(&self) -> Vec<(String, ChatMessage)> {
            self.posted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn post(&self, webhook_url: &str, message: &ChatMessage) -> ReportResult<()> {
            self.posted
                .lock()
                .unwrap()
                .push((webhook_url.to_string(), message.clone()));
            Ok(())
        }
    }

    const WEBHOOK: &str = "https://hooks.slack.com/services/T0/B0/secret";

    fn settings(policy: IdentityPolicy) -> JobSettings {
        JobSettings {
            metric: CostMetric::Unblended,
            offsets: BoundaryOffsets::default(),
            identity_policy: policy,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn services() -> Vec<(String, String)> {
        vec![
            ("Amazon S3".to_string(), "10.00".to_string()),
            ("AWS Lambda".to_string(), "5.00".to_string()),
        ]
    }

    #[tokio::test]
    async fn successful_run_posts_exactly_one_message() {
        let billing = FakeBilling {
            fail_total: false,
            groups: services(),
        };
        let identity = FakeIdentity(Some("123456789012"));
        let secrets = FakeSecrets(Some(WEBHOOK));
        let sink = RecordingSink::default();
        let notify = NotifySettings::default();

        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Lenient),
        };
        let delivery = Delivery {
            secrets: &secrets,
            sink: &sink,
            notify: &notify,
        };

        let report = run(&job, &delivery, date("2024-04-01")).await.unwrap();
        assert_eq!(report.account_id, "123456789012");
        assert_eq!(report.period.start, date("2024-03-01"));
        assert_eq!(report.period.end, date("2024-03-31"));

        let posted = sink.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, WEBHOOK);
        let text = &posted[0].1.text;
        assert!(text.contains("123456789012"));
        assert!(text.contains("$123.45"));
        assert!(text.find("AWS Lambda :  5.00").unwrap() < text.find("Amazon S3 :  10.00").unwrap());
    }

    #[tokio::test]
    async fn total_query_failure_never_posts() {
        let billing = FakeBilling {
            fail_total: true,
            groups: services(),
        };
        let identity = FakeIdentity(Some("123456789012"));
        let secrets = FakeSecrets(Some(WEBHOOK));
        let sink = RecordingSink::default();
        let notify = NotifySettings::default();

        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Lenient),
        };
        let delivery = Delivery {
            secrets: &secrets,
            sink: &sink,
            notify: &notify,
        };

        let err = run(&job, &delivery, date("2024-03-15")).await.unwrap_err();
        assert!(matches!(err, ReportError::Upstream { .. }));
        assert!(sink.posted().is_empty());
    }

    #[tokio::test]
    async fn lenient_identity_failure_posts_with_empty_account() {
        let billing = FakeBilling {
            fail_total: false,
            groups: Vec::new(),
        };
        let identity = FakeIdentity(None);
        let secrets = FakeSecrets(Some(WEBHOOK));
        let sink = RecordingSink::default();
        let notify = NotifySettings::default();

        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Lenient),
        };
        let delivery = Delivery {
            secrets: &secrets,
            sink: &sink,
            notify: &notify,
        };

        let report = run(&job, &delivery, date("2024-03-15")).await.unwrap();
        assert_eq!(report.account_id, "");
        assert!(report.services.is_empty());
        let posted = sink.posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].1.text.ends_with("``````"));
    }

    #[tokio::test]
    async fn strict_identity_failure_never_posts() {
        let billing = FakeBilling {
            fail_total: false,
            groups: services(),
        };
        let identity = FakeIdentity(None);
        let secrets = FakeSecrets(Some(WEBHOOK));
        let sink = RecordingSink::default();
        let notify = NotifySettings::default();

        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Strict),
        };
        let delivery = Delivery {
            secrets: &secrets,
            sink: &sink,
            notify: &notify,
        };

        let err = run(&job, &delivery, date("2024-03-15")).await.unwrap_err();
        assert!(err.to_string().contains("ExpiredToken"));
        assert!(sink.posted().is_empty());
    }

    #[tokio::test]
    async fn missing_webhook_secret_never_posts() {
        let billing = FakeBilling {
            fail_total: false,
            groups: services(),
        };
        let identity = FakeIdentity(Some("123456789012"));
        let secrets = FakeSecrets(None);
        let sink = RecordingSink::default();
        let notify = NotifySettings::default();

        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Lenient),
        };
        let delivery = Delivery {
            secrets: &secrets,
            sink: &sink,
            notify: &notify,
        };

        let err = run(&job, &delivery, date("2024-03-15")).await.unwrap_err();
        assert!(err.to_string().contains("ParameterNotFound"));
        assert!(sink.posted().is_empty());
    }

    #[tokio::test]
    async fn build_report_uses_total_window_for_display() {
        let billing = FakeBilling {
            fail_total: false,
            groups: services(),
        };
        let identity = FakeIdentity(Some("123456789012"));
        let job = ReportJob {
            billing: &billing,
            identity: &identity,
            settings: settings(IdentityPolicy::Lenient),
        };

        let report = job.build_report(date("2024-03-15")).await.unwrap();
        assert_eq!(report.period, report.total.period);
        assert_eq!(report.period.end, date("2024-03-14"));
    }
}
