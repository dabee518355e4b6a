use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Who a welcome email is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Admin,
}

/// Payload handed to the outbound mail collaborator after a registration commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeEmail {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
}

impl WelcomeEmail {
    pub const SENDER: &'static str = "EduReminder <onboarding@resend.dev>";

    pub fn subject(&self) -> &'static str {
        match self.user_type {
            UserType::Student => "Welcome to EduReminder - Student Registration Confirmed!",
            UserType::Admin => "Welcome to EduReminder - Admin Account Created!",
        }
    }

    pub fn html_body(&self) -> String {
        match self.user_type {
            UserType::Student => format!(
                "<h1>Welcome to EduReminder, {}!</h1>\
                 <p>Your student registration has been successfully completed.</p>\
                 <p>You will now receive notifications about your classes and important announcements.</p>\
                 <p>Best regards,<br>The EduReminder Team</p>",
                self.first_name
            ),
            UserType::Admin => format!(
                "<h1>Welcome to EduReminder Admin Panel, {}!</h1>\
                 <p>Your admin account has been successfully created.</p>\
                 <p>You can now access the admin dashboard to manage class notifications.</p>\
                 <p>Best regards,<br>The EduReminder Team</p>",
                self.first_name
            ),
        }
    }
}

/// Acknowledgement from a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryReceipt {
    Delivered { message_id: String },
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail worker has shut down")]
    Closed,
}

/// Outbound welcome-mail hook. Callers treat every failure as non-fatal.
pub trait WelcomeMailer: Send + Sync {
    fn send(&self, email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Audit entry for one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailNotificationRecord {
    pub recipient_email: String,
    pub email_type: UserType,
    pub subject: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Delivery records kept by [`BackgroundMailer::spawn`]. Older records are dropped first.
pub const DEFAULT_DELIVERY_LOG_CAPACITY: usize = 512;

type DeliveryLog = Arc<Mutex<VecDeque<EmailNotificationRecord>>>;

/// Detaches delivery from the request path.
///
/// `send` only enqueues. A worker task hands each email to the wrapped transport on the
/// blocking pool, logs the outcome, and appends it to a bounded delivery log.
pub struct BackgroundMailer {
    sender: mpsc::UnboundedSender<WelcomeEmail>,
    log: DeliveryLog,
    worker: JoinHandle<()>,
}

impl BackgroundMailer {
    /// Start the worker on the current tokio runtime.
    pub fn spawn<M>(transport: Arc<M>) -> Self
    where
        M: WelcomeMailer + 'static,
    {
        Self::with_log_capacity(transport, DEFAULT_DELIVERY_LOG_CAPACITY)
    }

    /// Like [`spawn`](Self::spawn), keeping at most `capacity` delivery records.
    pub fn with_log_capacity<M>(transport: Arc<M>, capacity: usize) -> Self
    where
        M: WelcomeMailer + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let log = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));
        let worker = tokio::spawn(run_worker(transport, receiver, Arc::clone(&log), capacity));

        Self {
            sender,
            log,
            worker,
        }
    }

    /// Stop accepting mail, wait for the queue to drain, and return the retained log.
    pub async fn close(self) -> Vec<EmailNotificationRecord> {
        let Self {
            sender,
            log,
            worker,
        } = self;
        drop(sender);
        if let Err(err) = worker.await {
            warn!(error = %err, "welcome mail worker ended abnormally");
        }

        let entries = match log.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        };
        entries
    }
}

impl WelcomeMailer for BackgroundMailer {
    fn send(&self, email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError> {
        self.sender
            .send(email)
            .map(|()| DeliveryReceipt::Queued)
            .map_err(|_| MailerError::Closed)
    }
}

async fn run_worker<M>(
    transport: Arc<M>,
    mut receiver: mpsc::UnboundedReceiver<WelcomeEmail>,
    log: DeliveryLog,
    capacity: usize,
) where
    M: WelcomeMailer + 'static,
{
    while let Some(email) = receiver.recv().await {
        let recipient_email = email.email.clone();
        let email_type = email.user_type;
        let subject = email.subject().to_string();

        let transport = Arc::clone(&transport);
        let outcome = tokio::task::spawn_blocking(move || transport.send(email))
            .await
            .unwrap_or_else(|err| Err(MailerError::Transport(err.to_string())));

        let (status, detail) = match outcome {
            Ok(receipt) => {
                info!(recipient = %recipient_email, ?email_type, ?receipt, "welcome email sent");
                (DeliveryStatus::Sent, None)
            }
            Err(err) => {
                warn!(recipient = %recipient_email, ?email_type, error = %err, "welcome email failed");
                (DeliveryStatus::Failed, Some(err.to_string()))
            }
        };

        let record = EmailNotificationRecord {
            recipient_email,
            email_type,
            subject,
            status,
            detail,
            sent_at: Utc::now(),
        };
        if capacity > 0 {
            let mut entries = match log.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            while entries.len() >= capacity {
                entries.pop_front();
            }
            entries.push_back(record);
        }
    }
}
