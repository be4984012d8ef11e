/// Database configuration and connection management
pub mod database;

/// Payroll settings and seed employees from config.toml
pub mod payroll;
