use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::domain::{NotificationPreference, StudentRegistration, UnknownPreference};

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// A roster row that could not be turned into a registration or was refused on intake.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub email: String,
    pub reason: String,
}

/// A parsed roster row, tagged with its line in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub line: u64,
    pub registration: StudentRegistration,
}

/// Reads student rosters exported from a spreadsheet.
///
/// Expected header: `first_name,last_name,email,phone,level,department` with optional
/// `notification_preference`, `email_notifications` and `sms_notifications` columns.
pub struct RosterImporter;

impl RosterImporter {
    /// Parse every row. Rows with an unreadable preference column are rejected
    /// individually; structural CSV problems abort the whole import.
    pub fn from_reader<R: Read>(
        reader: R,
    ) -> Result<(Vec<RosterEntry>, Vec<RejectedRow>), RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut record = csv::StringRecord::new();
        let mut entries = Vec::new();
        let mut rejected = Vec::new();

        while csv_reader.read_record(&mut record)? {
            let line = record.position().map_or(0, |position| position.line());
            let row: RosterRow = record.deserialize(Some(&headers))?;

            match row.preference() {
                Ok(notification_preference) => entries.push(RosterEntry {
                    line,
                    registration: row.into_registration(notification_preference),
                }),
                Err(reason) => rejected.push(RejectedRow {
                    line,
                    email: row.email,
                    reason,
                }),
            }
        }

        Ok((entries, rejected))
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    level: String,
    #[serde(default)]
    department: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notification_preference: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email_notifications: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sms_notifications: Option<String>,
}

impl RosterRow {
    fn preference(&self) -> Result<NotificationPreference, String> {
        match self.notification_preference.as_deref() {
            None => Ok(NotificationPreference::default()),
            Some(raw) => raw
                .parse()
                .map_err(|err: UnknownPreference| err.to_string()),
        }
    }

    fn into_registration(
        self,
        notification_preference: NotificationPreference,
    ) -> StudentRegistration {
        let email_notifications = flag(self.email_notifications.as_deref(), true);
        let sms_notifications = flag(
            self.sms_notifications.as_deref(),
            notification_preference != NotificationPreference::Email,
        );

        StudentRegistration {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            level: self.level,
            department: self.department,
            notification_preference,
            email_notifications,
            sms_notifications,
        }
    }
}

fn flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) => matches!(value.as_str(), "true" | "yes" | "y" | "1"),
        None => default,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
