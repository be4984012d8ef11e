#![allow(clippy::result_large_err)]

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use factory_payroll::{
    config::{database, payroll},
    core::{
        absence::{self, AbsenceSummary, DailyAbsence, DailyAbsenceEdit},
        bundle, dashboard, employee,
        notes::{DEFAULT_NOTE_COLOR, NoteDraft},
        overtime::{self, OvertimeEntry},
        payslip::{self, PayslipEdit},
        report::{self, PayslipFilter},
        state::AppState,
        storage,
    },
    errors::{Error, Result},
    models::{Employee, PayPeriod, Payslip, Settings, overtime::DATE_FORMAT, payslip::payslip_id},
    webhook::{Delivery, SheetPayload},
};
use sea_orm::DatabaseConnection;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Payroll and HR administration for a small factory
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show totals, top performers and the six-month payout series
    Dashboard,
    /// Show the effective hourly overtime rate
    Rate,
    /// Employee registry
    #[command(subcommand)]
    Employees(EmployeesCommand),
    /// Record overtime hours worked on one date
    Overtime {
        /// Date worked (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Hours per employee as `CODE=HOURS`, e.g. `F-101=2.5`
        #[arg(long = "hours", required = true, value_parser = parse_code_amount)]
        hours: Vec<(String, f64)>,
        /// Employee code of the absent colleague being covered for
        #[arg(long)]
        absent: Option<String>,
    },
    /// Prepare (and optionally finalize) the salary batch of a month
    Process {
        #[arg(long)]
        year: i32,
        /// Calendar month, 1-12
        #[arg(long)]
        month: u32,
        /// Leave an employee out of the batch
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// Override an employee's basic salary for this batch as `CODE=AMOUNT`
        #[arg(long = "basic", value_parser = parse_code_amount)]
        basic: Vec<(String, f64)>,
        /// Store the batch as processed payslips
        #[arg(long)]
        finalize: bool,
        /// Send the batch to the spreadsheet webhook
        #[arg(long)]
        send: bool,
    },
    /// List stored payslips
    Reports {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        /// Case-insensitive part of the employee name
        #[arg(long, default_value = "")]
        search: String,
        /// Send the listed payslips to the spreadsheet webhook
        #[arg(long)]
        send: bool,
    },
    /// Show absence deductions per absent person
    Absences {
        /// Send the summary to the spreadsheet webhook
        #[arg(long)]
        send: bool,
        #[command(subcommand)]
        action: Option<AbsencesCommand>,
    },
    /// Import employees from a CSV file
    ImportEmployees { path: PathBuf },
    /// Export every collection to a JSON file
    Export { path: PathBuf },
    /// Replace every collection with the contents of an exported JSON file
    Import { path: PathBuf },
    /// Settings management
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Notes board
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Delete all stored data; the next run seeds again from the config file
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum EmployeesCommand {
    /// List employees
    List,
    /// Delete an employee with their payslips, overtime records and CV
    Delete { code: String },
}

#[derive(Debug, Subcommand)]
enum AbsencesCommand {
    /// Delete the absences of one person, or of one day with `--date`
    Delete {
        /// Name of the absent person
        person: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Edit one day of absence
    Edit {
        /// Name of the absent person
        person: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        new_date: Option<NaiveDate>,
        #[arg(long)]
        new_person: Option<String>,
        /// Remark for the day; an empty remark removes it
        #[arg(long)]
        remark: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change settings; options left out keep their current value
    Set {
        /// Fixed hourly overtime rate, 0 to derive it from the basic salary
        #[arg(long)]
        overtime_rate: Option<f64>,
        #[arg(long)]
        multiplier: Option<f64>,
        /// Basic salary the derived rate is computed from
        #[arg(long)]
        calculation_basic_salary: Option<f64>,
        #[arg(long)]
        working_days: Option<f64>,
        #[arg(long)]
        working_hours: Option<f64>,
        /// Google Sheets webhook URL, empty to disable
        #[arg(long)]
        sheets_url: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum NotesCommand {
    /// List notes, newest first
    List,
    /// Add a note to the top of the board
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = DEFAULT_NOTE_COLOR)]
        color: String,
    },
}

fn parse_code_amount(raw: &str) -> std::result::Result<(String, f64), String> {
    let (code, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=AMOUNT, got `{raw}`"))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid number in `{raw}`: {e}"))?;
    Ok((code.trim().to_string(), amount))
}

/// Result of running one command.
#[derive(Debug, Default)]
struct Outcome {
    /// Whether the state changed and must be saved
    changed: bool,
    /// Webhook deliveries to report on
    deliveries: Vec<Delivery>,
}

impl Outcome {
    const fn changed() -> Self {
        Self {
            changed: true,
            deliveries: Vec::new(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the payroll configuration
    let config = load_configuration()?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    if let Command::Reset { yes } = &cli.command {
        if !*yes {
            println!("This deletes all stored data. Run again with --yes to confirm.");
            return Ok(());
        }
        let removed = storage::clear_state(&db).await?;
        println!("Deleted {removed} stored collections.");
        return Ok(());
    }

    // 5. Load state, seeding it from the configuration on first run
    let mut state = load_or_seed(&db, &config).await?;

    // 6. Run the command, saving before any webhook notice is reported
    let outcome = run(cli.command, &mut state)?;
    if outcome.changed {
        storage::save_state(&db, &state)
            .await
            .inspect_err(|e| error!("Failed to save state: {}", e))?;
    }

    for delivery in outcome.deliveries {
        println!("{}", delivery.notice().await);
    }

    Ok(())
}

fn load_configuration() -> Result<payroll::Config> {
    let path = payroll::config_path();
    if path == payroll::DEFAULT_CONFIG_PATH && !Path::new(&path).exists() {
        warn!("No {} found, using built-in defaults", payroll::DEFAULT_CONFIG_PATH);
        return Ok(payroll::Config::default());
    }

    let config = payroll::load_config(&path)?;
    info!(path = %path, seed_employees = config.employees.len(), "Loaded payroll configuration");
    Ok(config)
}

async fn load_or_seed(db: &DatabaseConnection, config: &payroll::Config) -> Result<AppState> {
    if storage::is_initialized(db).await? {
        return storage::load_state(db).await;
    }

    let mut state = AppState::default();
    state.update_settings(config.settings.to_settings())?;
    let seeded = config
        .employees
        .iter()
        .map(|seed| employee::create_employee(seed.to_draft()))
        .collect::<Result<Vec<_>>>()?;
    state.bulk_add_employees(seeded);

    storage::save_state(db, &state).await?;
    info!(employees = state.employees.len(), "Seeded a new payroll store");
    Ok(state)
}

/// Finds an employee by display code or internal id.
fn find_employee<'a>(state: &'a AppState, code: &str) -> Result<&'a Employee> {
    state
        .employees
        .iter()
        .find(|e| e.employee_id == code || e.id == code)
        .ok_or_else(|| Error::EmployeeNotFound {
            id: code.to_string(),
        })
}

fn find_absence(state: &AppState, person: &str) -> Result<AbsenceSummary> {
    state
        .absences()
        .into_iter()
        .find(|summary| summary.person_name == person)
        .ok_or_else(|| Error::validation(format!("No absences recorded for {person}.")))
}

fn find_day(summary: &AbsenceSummary, date: NaiveDate) -> Result<DailyAbsence> {
    let date = date.format(DATE_FORMAT).to_string();
    summary
        .daily
        .iter()
        .find(|day| day.date == date)
        .cloned()
        .ok_or_else(|| {
            Error::validation(format!(
                "No absence of {} recorded on {date}.",
                summary.person_name
            ))
        })
}

fn run(command: Command, state: &mut AppState) -> Result<Outcome> {
    match command {
        Command::Dashboard => {
            print_dashboard(state);
            Ok(Outcome::default())
        }
        Command::Rate => {
            let rate = overtime::resolve_rate(&state.settings);
            println!("Effective overtime rate: {}/hour", report::format_amount(rate));
            Ok(Outcome::default())
        }
        Command::Employees(command) => run_employees(command, state),
        Command::Overtime {
            date,
            hours,
            absent,
        } => {
            let entries = hours
                .iter()
                .map(|(code, hours)| {
                    Ok(OvertimeEntry {
                        employee_id: find_employee(state, code)?.id.clone(),
                        hours: *hours,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let absent_id = absent
                .map(|code| find_employee(state, &code).map(|e| e.id.clone()))
                .transpose()?;

            let created = state.save_overtime(&entries, date, absent_id.as_deref())?;
            for record in &created {
                println!(
                    "{} | {} | {}h x {} = {}",
                    record.date,
                    record.employee_name,
                    record.hours,
                    report::format_amount(record.rate),
                    report::format_amount(record.total_amount)
                );
            }

            let mut outcome = Outcome::changed();
            if state.settings.webhook_url().is_some() {
                outcome.deliveries.push(Delivery::start(
                    &state.settings,
                    Ok(SheetPayload::overtime_records(created)),
                ));
            }
            Ok(outcome)
        }
        Command::Process {
            year,
            month,
            exclude,
            basic,
            finalize,
            send,
        } => {
            let period = PayPeriod::new(year, month)?;
            let batch = prepare_batch(state, period, &exclude, &basic)?;

            println!("Salary batch for {}", period.label());
            for slip in &batch {
                println!("{}", report::format_payslip_summary(slip));
            }

            let mut outcome = Outcome::default();
            if finalize {
                state.process_salaries(&batch);
                println!("Finalized {} payslips", batch.len());
                outcome.changed = true;
            }
            if send {
                let payload = SheetPayload::salary_processing(&batch, &state.employees, period);
                outcome
                    .deliveries
                    .push(Delivery::start(&state.settings, payload));
            }
            Ok(outcome)
        }
        Command::Reports {
            year,
            month,
            search,
            send,
        } => {
            let filter = PayslipFilter {
                year,
                month,
                search,
            };
            let payslips = report::filter_payslips(&state.payslips, &filter);
            println!(
                "Years with payslips: {:?}",
                report::available_years(&state.payslips)
            );
            for slip in &payslips {
                println!("{}", report::format_payslip_summary(slip));
            }

            let mut outcome = Outcome::default();
            if send {
                let payload = SheetPayload::salary_report(&payslips, &state.employees);
                outcome
                    .deliveries
                    .push(Delivery::start(&state.settings, payload));
            }
            Ok(outcome)
        }
        Command::Absences {
            action: Some(action),
            ..
        } => run_absence_action(action, state),
        Command::Absences { send, action: None } => {
            let summaries = state.absences();
            print_absences(&summaries);

            let mut outcome = Outcome::default();
            if send {
                let payload = SheetPayload::absence_summary(&summaries);
                outcome
                    .deliveries
                    .push(Delivery::start(&state.settings, payload));
            }
            Ok(outcome)
        }
        Command::ImportEmployees { path } => {
            let file = std::fs::File::open(&path)?;
            let imported = employee::parse_employee_csv(file)?;
            let (added, duplicates) = state.bulk_add_employees(imported);
            println!(
                "{added} new employees imported successfully. {duplicates} duplicates were ignored."
            );
            Ok(Outcome::changed())
        }
        Command::Export { path } => {
            std::fs::write(&path, state.export_bundle().to_json()?)?;
            println!("Exported data to {}", path.display());
            Ok(Outcome::default())
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path)?;
            state.apply_bundle(bundle::parse_bundle(&text)?);
            println!("Data imported successfully from {}", path.display());
            Ok(Outcome::changed())
        }
        Command::Settings(SettingsCommand::Show) => {
            print_settings(&state.settings);
            Ok(Outcome::default())
        }
        Command::Settings(SettingsCommand::Set {
            overtime_rate,
            multiplier,
            calculation_basic_salary,
            working_days,
            working_hours,
            sheets_url,
        }) => {
            let current = state.settings.clone();
            state.update_settings(Settings {
                overtime_rate: overtime_rate.unwrap_or(current.overtime_rate),
                overtime_multiplier: multiplier.unwrap_or(current.overtime_multiplier),
                overtime_calculation_basic_salary: calculation_basic_salary
                    .unwrap_or(current.overtime_calculation_basic_salary),
                working_days_per_month: working_days.unwrap_or(current.working_days_per_month),
                working_hours_per_day: working_hours.unwrap_or(current.working_hours_per_day),
                google_sheets_url: sheets_url.unwrap_or(current.google_sheets_url),
            })?;
            print_settings(&state.settings);
            Ok(Outcome::changed())
        }
        Command::Notes(NotesCommand::List) => {
            for note in &state.notes {
                println!(
                    "[{}] {} ({})\n    {}",
                    note.updated_at.format("%Y-%m-%d %H:%M"),
                    note.title,
                    note.color,
                    note.content
                );
            }
            Ok(Outcome::default())
        }
        Command::Notes(NotesCommand::Add {
            title,
            content,
            color,
        }) => {
            state.add_note(NoteDraft {
                title,
                content,
                color,
            });
            println!("Note added");
            Ok(Outcome::changed())
        }
        Command::Reset { .. } => Err(Error::validation("Reset runs before any state is loaded.")),
    }
}

/// Prepares a month's batch, applying exclusions and basic salary overrides.
fn prepare_batch(
    state: &AppState,
    period: PayPeriod,
    exclude: &[String],
    basic: &[(String, f64)],
) -> Result<Vec<Payslip>> {
    let mut batch = payslip::prepare_batch(&state.employees, &state.overtime_records, period);

    for code in exclude {
        let id = payslip_id(&find_employee(state, code)?.id, period);
        batch = payslip::remove_from_batch(&batch, &id)?;
    }
    for (code, amount) in basic {
        let employee = find_employee(state, code)?;
        let edit = PayslipEdit {
            basic_salary: *amount,
            allowances: employee.allowances.clone(),
            deductions: employee.deductions.clone(),
        };
        batch = payslip::edit_in_batch(&batch, &payslip_id(&employee.id, period), &edit)?;
    }

    Ok(batch)
}

fn run_employees(command: EmployeesCommand, state: &mut AppState) -> Result<Outcome> {
    match command {
        EmployeesCommand::List => {
            for e in &state.employees {
                println!(
                    "{} | {} | {} | {} | {}",
                    e.employee_id,
                    e.name,
                    e.department,
                    e.designation,
                    report::format_amount(e.basic_salary)
                );
            }
            Ok(Outcome::default())
        }
        EmployeesCommand::Delete { code } => {
            let employee = find_employee(state, &code)?;
            let (id, name) = (employee.id.clone(), employee.name.clone());
            state.delete_employee(&id)?;
            println!("Deleted {name} and their payslips, overtime records and CV");
            Ok(Outcome::changed())
        }
    }
}

fn run_absence_action(action: AbsencesCommand, state: &mut AppState) -> Result<Outcome> {
    match action {
        AbsencesCommand::Delete { person, date: None } => {
            let summary = find_absence(state, &person)?;
            state.delete_absence_group(&summary);
            println!("Deleted {} absence records of {person}", summary.record_ids.len());
        }
        AbsencesCommand::Delete {
            person,
            date: Some(date),
        } => {
            let day = find_day(&find_absence(state, &person)?, date)?;
            state.delete_daily_absence(&day);
            println!("Deleted the absence of {person} on {}", day.date);
        }
        AbsencesCommand::Edit {
            person,
            date,
            new_date,
            new_person,
            remark,
        } => {
            let day = find_day(&find_absence(state, &person)?, date)?;
            let edit = DailyAbsenceEdit {
                date: new_date.unwrap_or(date),
                absent_person_name: new_person.unwrap_or(person),
                hours: Vec::new(),
                remark: remark.unwrap_or_else(|| day.remark.clone()),
            };
            state.edit_daily_absence(&day, &edit)?;
            println!("Updated the absence of {} on {}", edit.absent_person_name, edit.date);
        }
    }
    Ok(Outcome::changed())
}

fn print_absences(summaries: &[AbsenceSummary]) {
    for summary in summaries {
        println!(
            "{}: {}h, deduction {}",
            summary.person_name,
            summary.total_hours,
            report::format_amount(summary.total_deduction)
        );
        for day in &summary.daily {
            let remark = if day.remark.is_empty() {
                String::new()
            } else {
                format!(" ({})", day.remark)
            };
            println!(
                "  {} | {}h | {}{remark}",
                day.date,
                day.total_hours,
                report::format_amount(day.total_deduction)
            );
        }
    }
    let totals = absence::absence_totals(summaries);
    println!(
        "Total: {}h, deduction {}",
        totals.total_hours,
        report::format_amount(totals.total_pay)
    );
}

fn print_settings(settings: &Settings) {
    println!("Overtime rate (fixed):     {}", settings.overtime_rate);
    println!("Overtime multiplier:       {}", settings.overtime_multiplier);
    println!(
        "Calculation basic salary:  {}",
        settings.overtime_calculation_basic_salary
    );
    println!("Working days per month:    {}", settings.working_days_per_month);
    println!("Working hours per day:     {}", settings.working_hours_per_day);
    println!(
        "Google Sheets URL:         {}",
        settings.webhook_url().unwrap_or("(not configured)")
    );
}

fn print_dashboard(state: &AppState) {
    let stats = dashboard::dashboard_stats(&state.employees, &state.payslips, &state.overtime_records);

    println!("Employees:          {}", stats.total_employees);
    println!("Payslips generated: {}", stats.payslips_generated);
    println!("Total salary paid:  {}", report::format_amount(stats.total_salary_paid));
    println!("Total overtime:     {}", report::format_amount(stats.total_overtime));
    println!("Total deductions:   {}", report::format_amount(stats.total_deductions));
    for (label, top) in [
        ("Top salary earner", &stats.top_salary_earner),
        ("Top overtime earner", &stats.top_overtime_earner),
        ("Top deductions", &stats.top_deduction_person),
    ] {
        println!("{label}: {} ({})", top.name, report::format_amount(top.amount));
    }

    println!("\nLast six months:");
    let series = dashboard::monthly_payout_series(&state.payslips, Utc::now().date_naive());
    let peak = series.iter().map(|m| m.total).fold(0.0, f64::max);
    for month in &series {
        println!(
            "  {:<7} {} {}",
            month.label,
            report::format_share_bar(report::share_percent(month.total, peak), None),
            report::format_amount(month.total)
        );
    }

    println!("\nBy department:");
    let distribution = dashboard::department_distribution(&state.payslips, &state.employees);
    let total: f64 = distribution.iter().map(|(_, amount)| amount).sum();
    for (department, amount) in &distribution {
        println!(
            "  {department}: {} {}",
            report::format_amount(*amount),
            report::format_share_bar(report::share_percent(*amount, total), None)
        );
    }
}
