use edu_reminder::error::AppError;
use edu_reminder::workflows::portal::{
    DeliveryReceipt, MailerError, PortalService, RecordStore, RosterImportReport, WelcomeEmail,
    WelcomeMailer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mail transport that only writes the rendered message to the log.
#[derive(Debug, Default)]
pub(crate) struct LogMailer {
    sequence: AtomicU64,
}

impl WelcomeMailer for LogMailer {
    fn send(&self, email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id = format!("log-{id:06}");
        info!(
            %message_id,
            from = WelcomeEmail::SENDER,
            to = %email.email,
            subject = email.subject(),
            body_bytes = email.html_body().len(),
            "welcome email"
        );
        Ok(DeliveryReceipt::Delivered { message_id })
    }
}

/// Register every row of a roster CSV, logging rows that were turned away.
pub(crate) fn seed_roster<S, M>(
    service: &PortalService<S, M>,
    path: &Path,
) -> Result<RosterImportReport, AppError>
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    let file = File::open(path)?;
    let report = service.import_roster(file)?;
    for row in &report.rejected {
        warn!(line = row.line, email = %row.email, reason = %row.reason, "roster row rejected");
    }
    info!(
        path = %path.display(),
        imported = report.imported,
        rejected = report.rejected.len(),
        "roster seeded"
    );
    Ok(report)
}
