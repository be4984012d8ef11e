//! Spreadsheet webhook - best-effort JSON POSTs to the configured Google Sheets URL.
//!
//! Deliveries are fire-and-forget: a failed POST is logged and reported back as a notice
//! and never touches local state, which has already been saved by the time it is sent.

use crate::{
    core::{absence::AbsenceSummary, report},
    errors::{Error, Result},
    models::{Employee, OvertimeRecord, PayPeriod, Payslip, Settings},
};
use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One row of the absence deduction summary sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRow {
    /// Serial number, starting at 1
    pub sl: usize,
    /// Absent person
    pub employee_name: String,
    /// Overtime hours worked on their behalf
    pub total_hours: f64,
    /// Overtime pay charged to them
    pub total_deduction: f64,
}

/// Report documents, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Report {
    /// A freshly prepared salary batch
    SalaryProcessingReport {
        /// Month name, e.g. `March`
        month: String,
        /// Calendar year
        year: i32,
        /// One row per payslip
        data: Vec<report::SalaryReportRow>,
    },
    /// Stored payslips of one month
    #[allow(missing_docs)]
    SalaryReport {
        month: String,
        year: i32,
        data: Vec<report::SalaryReportRow>,
    },
    /// Overtime records in the salary sheet's date range
    OvertimeDetailsReport {
        /// Records in date order
        data: Vec<OvertimeRecord>,
    },
    /// Per-person absence totals
    AbsentDeductionSummary {
        /// One row per absent person
        data: Vec<AbsenceRow>,
    },
}

/// Body of a webhook POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SheetPayload {
    /// Newly saved overtime records
    Records {
        /// Records to append
        records: Vec<OvertimeRecord>,
    },
    /// A report document
    Report(Report),
}

impl SheetPayload {
    /// Payload for an overtime sheet that was just saved.
    #[must_use]
    pub fn overtime_records(records: Vec<OvertimeRecord>) -> Self {
        Self::Records { records }
    }

    /// Payload for a prepared salary batch.
    pub fn salary_processing(
        batch: &[Payslip],
        employees: &[Employee],
        period: PayPeriod,
    ) -> Result<Self> {
        if batch.is_empty() {
            return Err(Error::validation("There is no data to save."));
        }
        let refs: Vec<&Payslip> = batch.iter().collect();
        Ok(Self::Report(Report::SalaryProcessingReport {
            month: period.month_name(),
            year: period.year(),
            data: report::salary_report_rows(&refs, employees),
        }))
    }

    /// Payload for filtered stored payslips, which must cover a single month.
    pub fn salary_report(payslips: &[&Payslip], employees: &[Employee]) -> Result<Self> {
        let period = report::single_period(payslips)?;
        Ok(Self::Report(Report::SalaryReport {
            month: period.month_name(),
            year: period.year(),
            data: report::salary_report_rows(payslips, employees),
        }))
    }

    /// Payload for a list of overtime records.
    pub fn overtime_details(records: Vec<OvertimeRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::validation("There is no data to save."));
        }
        Ok(Self::Report(Report::OvertimeDetailsReport { data: records }))
    }

    /// Payload for the absence deduction summary.
    pub fn absence_summary(summaries: &[AbsenceSummary]) -> Result<Self> {
        if summaries.is_empty() {
            return Err(Error::validation("There is no data to save."));
        }
        let data = summaries
            .iter()
            .enumerate()
            .map(|(index, summary)| AbsenceRow {
                sl: index + 1,
                employee_name: summary.person_name.clone(),
                total_hours: summary.total_hours,
                total_deduction: summary.total_deduction,
            })
            .collect();
        Ok(Self::Report(Report::AbsentDeductionSummary { data }))
    }

    fn describe(&self) -> String {
        match self {
            Self::Records { records } => format!("{} records", records.len()),
            Self::Report(Report::SalaryProcessingReport { month, year, .. }) => {
                format!("Processing data for {month} {year}")
            }
            Self::Report(Report::SalaryReport { month, year, .. }) => {
                format!("Salary report for {month} {year}")
            }
            Self::Report(Report::OvertimeDetailsReport { data }) => {
                format!("{} overtime records", data.len())
            }
            Self::Report(Report::AbsentDeductionSummary { .. }) => {
                "Absent deduction summary".to_string()
            }
        }
    }
}

/// Posts payloads to the configured spreadsheet URL.
#[derive(Debug, Clone)]
pub struct SheetsWebhook {
    client: Client,
    url: String,
}

impl SheetsWebhook {
    /// Webhook for the URL in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.webhook_url().ok_or(Error::WebhookNotConfigured)?;
        Ok(Self {
            client: Client::new(),
            url: url.to_string(),
        })
    }

    /// Sends one payload and waits for the response.
    ///
    /// Unlike a plain fire-and-forget POST this also reads the response status, so a
    /// non-success reply from the spreadsheet script is reported as an error.
    pub async fn send(&self, payload: &SheetPayload) -> Result<()> {
        self.client
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Sends a payload in the background.
    ///
    /// The task resolves to a user-facing notice; delivery errors are logged and folded
    /// into the notice rather than returned.
    #[must_use]
    pub fn dispatch(self, payload: SheetPayload) -> JoinHandle<String> {
        tokio::spawn(async move {
            let what = payload.describe();
            match self.send(&payload).await {
                Ok(()) => {
                    info!(payload = %what, "Sent to Google Sheets");
                    format!("{what} sent to Google Sheets.")
                }
                Err(e) => {
                    error!(payload = %what, error = %e, "Failed to send to Google Sheets");
                    format!("Failed to send {what} to Google Sheets: {e}")
                }
            }
        })
    }
}

/// A webhook delivery that was started, or the reason none was.
#[derive(Debug)]
pub enum Delivery {
    /// POST running in the background, resolving to a notice
    Started(JoinHandle<String>),
    /// Nothing was sent
    Skipped(String),
}

impl Delivery {
    /// Starts delivering `payload` to the URL in `settings`.
    ///
    /// A missing URL or a payload that could not be built (for example from empty data)
    /// becomes a skipped delivery with a notice, never an error, so sending can follow a
    /// local change without putting it at risk.
    #[must_use]
    pub fn start(settings: &Settings, payload: Result<SheetPayload>) -> Self {
        let started = payload.and_then(|payload| {
            Ok(SheetsWebhook::from_settings(settings)?.dispatch(payload))
        });
        match started {
            Ok(handle) => Self::Started(handle),
            Err(e) => {
                warn!(error = %e, "Nothing sent to Google Sheets");
                match e {
                    Error::Validation { message } => Self::Skipped(message),
                    other => Self::Skipped(other.to_string()),
                }
            }
        }
    }

    /// Waits for the delivery to finish and returns its notice.
    pub async fn notice(self) -> String {
        match self {
            Self::Started(handle) => handle
                .await
                .unwrap_or_else(|e| format!("Google Sheets delivery did not finish: {e}")),
            Self::Skipped(reason) => reason,
        }
    }
}
