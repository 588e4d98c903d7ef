//! Entry rendering for text and JSON output

use enpass_storage_sqlite::Record;
use serde::Serialize;

/// Serializable view of one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryExport {
    pub title: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_seed: Option<String>,
}

impl EntryExport {
    /// Build from a record, decrypting the password only when asked
    ///
    /// A field that fails to decrypt is reported in `password_error` and does
    /// not prevent the rest of the entry from being shown.
    pub fn from_record(record: &Record, with_password: bool) -> Self {
        let (password, password_error) = if with_password {
            match record.password() {
                Ok(password) => (password.map(str::to_string), None),
                Err(e) => {
                    tracing::warn!("Cannot show password of {}: {}", record.title(), e);
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Self {
            title: record.title().to_string(),
            uuid: record.uuid().to_string(),
            password,
            password_error,
            totp_seed: with_password.then(|| record.totp_seed().map(str::to_string)).flatten(),
        }
    }

    /// One tab-separated line
    pub fn to_line(&self) -> String {
        let mut line = format!("{}\t{}", self.title, self.uuid);
        if let Some(password) = &self.password {
            line.push('\t');
            line.push_str(password);
        } else if let Some(error) = &self.password_error {
            line.push_str("\t<");
            line.push_str(error);
            line.push('>');
        }
        line
    }
}
