/// Absence deductions grouped by the absent person covered for
pub mod absence;

/// Whole-application JSON export and import
pub mod bundle;

/// CV documents: defaults, legacy upgrade and section editing
pub mod cv;

/// Dashboard totals, top performers and payout series
pub mod dashboard;

/// Employee registry and CSV import
pub mod employee;

/// Notes board
pub mod notes;

/// Overtime rate resolution, record creation and aggregation
pub mod overtime;

/// Payslip calculation and salary batch processing
pub mod payslip;

/// Payslip filtering and text formatting for reports
pub mod report;

/// Application state owning every collection
pub mod state;

/// Persistence of the collections as JSON documents
pub mod storage;
