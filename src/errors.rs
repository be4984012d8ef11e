use thiserror::Error;

/// Everything that can go wrong in the payroll crate
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with it
        message: String,
    },

    /// Rejected user input; the message is shown as is
    #[error("Validation error: {message}")]
    Validation {
        /// User-facing explanation
        message: String,
    },

    /// A year/month pair outside the calendar
    #[error("Invalid pay period: {month}/{year}")]
    InvalidPeriod {
        /// Requested year
        year: i32,
        /// Requested month, expected 1-12
        month: u32,
    },

    #[error("Employee not found: {id}")]
    #[allow(missing_docs)]
    EmployeeNotFound { id: String },

    #[error("Overtime record not found: {id}")]
    #[allow(missing_docs)]
    OvertimeRecordNotFound { id: String },

    #[error("Payslip not found: {id}")]
    #[allow(missing_docs)]
    PayslipNotFound { id: String },

    #[error("Note not found: {id}")]
    #[allow(missing_docs)]
    NoteNotFound { id: String },

    /// No spreadsheet webhook URL in the settings
    #[error("Google Sheets URL is not configured in Settings.")]
    WebhookNotConfigured,

    /// SQLite or SeaORM failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed stored or imported JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable employee CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Webhook transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
