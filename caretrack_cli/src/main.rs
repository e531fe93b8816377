use caretrack_core::*;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caretrack")]
#[command(about = "Personal health self-management toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's adherence, upcoming appointments, and recent readings (default)
    Dashboard,

    /// Manage medications and dose logs
    Med {
        #[command(subcommand)]
        command: MedCommands,
    },

    /// Manage appointments
    Appt {
        #[command(subcommand)]
        command: ApptCommands,
    },

    /// Manage health metric readings
    Metric {
        #[command(subcommand)]
        command: MetricCommands,
    },

    /// Export medication logs to CSV
    Export {
        /// Output file (defaults to medication_logs.csv in the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MedCommands {
    /// List medications (all, active, refill-needed)
    List {
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Add a medication
    Add(MedAdd),

    /// Change fields of an existing medication
    Edit(MedEdit),

    /// Remove a medication by id
    Remove { id: u32 },

    /// Show today's dose slots and statuses for a medication
    Schedule { id: u32 },

    /// Mark a dose slot taken today
    Take {
        id: u32,
        /// Scheduled slot being taken ("HH:MM")
        slot: String,
    },
}

#[derive(Args)]
struct MedAdd {
    #[arg(long)]
    name: String,

    #[arg(long)]
    dosage: String,

    #[arg(long)]
    frequency: String,

    /// Dose slots as a comma-delimited list ("08:00,20:00")
    #[arg(long, default_value = "")]
    times: String,

    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    end_date: Option<NaiveDate>,

    #[arg(long)]
    refill_date: Option<NaiveDate>,

    #[arg(long)]
    notes: Option<String>,
}

/// Fields to change on an existing medication; anything omitted keeps its
/// current value.
#[derive(Args)]
struct MedEdit {
    id: u32,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    dosage: Option<String>,

    #[arg(long)]
    frequency: Option<String>,

    /// Replacement dose slots as a comma-delimited list ("08:00,20:00")
    #[arg(long)]
    times: Option<String>,

    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    end_date: Option<NaiveDate>,

    #[arg(long)]
    refill_date: Option<NaiveDate>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum ApptCommands {
    /// List appointments (today, upcoming, past, all)
    List {
        #[arg(long, default_value = "upcoming")]
        view: String,
    },

    /// Add an appointment
    Add(ApptAdd),

    /// Change fields of an existing appointment
    Edit(ApptEdit),

    /// Remove an appointment by id
    Remove { id: u32 },
}

#[derive(Args)]
struct ApptAdd {
    #[arg(long)]
    title: String,

    #[arg(long)]
    provider: String,

    #[arg(long)]
    location: String,

    #[arg(long)]
    date: NaiveDate,

    /// Time of day ("HH:MM")
    #[arg(long)]
    time: String,

    /// routine, followup, urgent, specialist, lab
    #[arg(long, default_value = "routine")]
    kind: String,

    #[arg(long)]
    notes: Option<String>,
}

/// Fields to change on an existing appointment; anything omitted keeps its
/// current value.
#[derive(Args)]
struct ApptEdit {
    id: u32,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    /// Time of day ("HH:MM")
    #[arg(long)]
    time: Option<String>,

    /// routine, followup, urgent, specialist, lab
    #[arg(long)]
    kind: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum MetricCommands {
    /// List readings, most recent first
    List {
        /// blood_pressure, glucose, weight, temperature, heart_rate
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show per-kind summary statistics
    Stats,

    /// Record a reading
    Add(MetricAdd),

    /// Change fields of an existing reading
    Edit(MetricEdit),

    /// Remove a reading by id
    Remove { id: u32 },
}

#[derive(Args)]
struct MetricAdd {
    /// blood_pressure, glucose, weight, temperature, heart_rate
    #[arg(long)]
    kind: String,

    /// Numeric value, or "SYS/DIA" for blood pressure
    #[arg(long)]
    value: String,

    /// Defaults to the registry unit for the kind
    #[arg(long)]
    unit: Option<String>,

    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    time: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

/// Fields to change on an existing reading; anything omitted keeps its
/// current value.
#[derive(Args)]
struct MetricEdit {
    id: u32,

    /// blood_pressure, glucose, weight, temperature, heart_rate
    #[arg(long)]
    kind: Option<String>,

    #[arg(long)]
    value: Option<String>,

    #[arg(long)]
    unit: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    time: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        caretrack_core::logging::init_with_level("debug");
    } else {
        caretrack_core::logging::init();
    }

    // Failures are logged and surfaced; store state is left unchanged and
    // retrying means rerunning the command.
    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = RecordStore::new(&data_dir);

    match cli.command {
        Some(Commands::Dashboard) | None => cmd_dashboard(&store, &config),
        Some(Commands::Med { command }) => match command {
            MedCommands::List { filter } => cmd_med_list(&store, &config, &filter),
            MedCommands::Add(args) => cmd_med_add(&store, args),
            MedCommands::Edit(args) => cmd_med_edit(&store, args),
            MedCommands::Remove { id } => cmd_med_remove(&store, id),
            MedCommands::Schedule { id } => cmd_med_schedule(&store, id),
            MedCommands::Take { id, slot } => cmd_med_take(&store, id, &slot),
        },
        Some(Commands::Appt { command }) => match command {
            ApptCommands::List { view } => cmd_appt_list(&store, &view),
            ApptCommands::Add(args) => cmd_appt_add(&store, args),
            ApptCommands::Edit(args) => cmd_appt_edit(&store, args),
            ApptCommands::Remove { id } => cmd_appt_remove(&store, id),
        },
        Some(Commands::Metric { command }) => match command {
            MetricCommands::List { kind } => cmd_metric_list(&store, kind.as_deref()),
            MetricCommands::Stats => cmd_metric_stats(&store, &config),
            MetricCommands::Add(args) => cmd_metric_add(&store, args),
            MetricCommands::Edit(args) => cmd_metric_edit(&store, args),
            MetricCommands::Remove { id } => cmd_metric_remove(&store, id),
        },
        Some(Commands::Export { out }) => {
            let csv_path = out.unwrap_or_else(|| data_dir.join("medication_logs.csv"));
            cmd_export(&store, &csv_path)
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

fn cmd_dashboard(store: &RecordStore, config: &Config) -> Result<()> {
    // All four tables load before anything renders; one failure fails the
    // whole view and the retry is rerunning the command.
    let medications = store.list::<Medication>()?;
    let appointments = store.list::<Appointment>()?;
    let metrics = store.list::<HealthMetric>()?;
    let logs = store.list::<MedicationLog>()?;

    let today = Local::now().date_naive();
    let now = Local::now().format("%H:%M").to_string();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CARETRACK — {}", today.format("%A, %B %d, %Y"));
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Today's adherence:  {}%",
        schedule::adherence(&medications, &logs, today)
    );
    println!(
        "  Next appointment:   {}",
        next_appointment_label(&appointments, today)
    );
    println!(
        "  Active medications: {}",
        filter_medications(
            &medications,
            MedicationFilter::Active,
            today,
            config.medications.refill_warning_days
        )
        .len()
    );
    println!();

    let due_today = summary::medications_due_today(&medications);
    if !due_today.is_empty() {
        println!("  Today's medications:");
        for med in due_today.iter().take(3) {
            let next = next_dose(&med.times, &now).unwrap_or("—");
            println!("    {} {} — next dose {}", med.name, med.dosage, next);
            if summary::refill_due(med, today, config.medications.refill_warning_days) {
                if let Some(date) = med.refill_date {
                    println!("      ⚠ refill needed by {}", date.format("%b %d"));
                }
            }
        }
        println!();
    }

    let upcoming = appointments_view(&appointments, AppointmentView::Upcoming, today);
    if !upcoming.is_empty() {
        println!("  Upcoming appointments:");
        for appt in upcoming.iter().take(2) {
            println!(
                "    {} {} — {} with {}",
                appt.date,
                appt.time,
                appt.title,
                appt.provider
            );
        }
        println!();
    }

    let recent = summary::recent_metrics(&metrics, 3);
    if !recent.is_empty() {
        println!("  Recent readings:");
        for metric in &recent {
            println!(
                "    {} — {} {} ({})",
                kind_info(metric.kind).label,
                metric.value,
                metric.unit,
                metric.date
            );
        }
        println!();
    }

    Ok(())
}

// ============================================================================
// Medications
// ============================================================================

fn cmd_med_list(store: &RecordStore, config: &Config, filter: &str) -> Result<()> {
    let filter = match filter.to_lowercase().as_str() {
        "all" => MedicationFilter::All,
        "active" => MedicationFilter::Active,
        "refill-needed" | "refill_needed" => MedicationFilter::RefillNeeded,
        other => {
            eprintln!("Unknown filter: {}. Showing all.", other);
            MedicationFilter::All
        }
    };

    let medications = store.list::<Medication>()?;
    let today = Local::now().date_naive();
    let selected = filter_medications(
        &medications,
        filter,
        today,
        config.medications.refill_warning_days,
    );

    if selected.is_empty() {
        println!("No medications found.");
        return Ok(());
    }

    for med in selected {
        let times = if med.times.is_empty() {
            "no schedule".to_string()
        } else {
            med.times.join(", ")
        };
        println!("[{}] {} {} — {} ({})", med.id, med.name, med.dosage, med.frequency, times);
        if summary::refill_due(med, today, config.medications.refill_warning_days) {
            if let Some(date) = med.refill_date {
                println!("    ⚠ refill needed by {}", date.format("%b %d"));
            }
        }
    }

    Ok(())
}

fn cmd_med_add(store: &RecordStore, args: MedAdd) -> Result<()> {
    let medication = Medication {
        id: 0,
        name: args.name,
        dosage: args.dosage,
        frequency: args.frequency,
        times: normalize_times(&args.times),
        start_date: args.start_date,
        end_date: args.end_date,
        refill_date: args.refill_date,
        notes: args.notes,
    };

    check_valid(registry::validate_medication(&medication))?;

    let created = store.create(medication)?;
    println!("✓ Added medication [{}] {}", created.id, created.name);
    Ok(())
}

fn cmd_med_edit(store: &RecordStore, args: MedEdit) -> Result<()> {
    let mut medication: Medication = store.get(args.id)?;

    if let Some(name) = args.name {
        medication.name = name;
    }
    if let Some(dosage) = args.dosage {
        medication.dosage = dosage;
    }
    if let Some(frequency) = args.frequency {
        medication.frequency = frequency;
    }
    if let Some(times) = args.times {
        medication.times = normalize_times(&times);
    }
    if let Some(date) = args.start_date {
        medication.start_date = Some(date);
    }
    if let Some(date) = args.end_date {
        medication.end_date = Some(date);
    }
    if let Some(date) = args.refill_date {
        medication.refill_date = Some(date);
    }
    if let Some(notes) = args.notes {
        medication.notes = Some(notes);
    }

    check_valid(registry::validate_medication(&medication))?;

    let updated = store.update(args.id, medication)?;
    println!("✓ Updated medication [{}] {}", updated.id, updated.name);
    Ok(())
}

fn cmd_med_remove(store: &RecordStore, id: u32) -> Result<()> {
    let deleted = store.delete::<Medication>(id)?;
    println!("✓ Removed medication [{}] {}", deleted.id, deleted.name);
    Ok(())
}

fn cmd_med_schedule(store: &RecordStore, id: u32) -> Result<()> {
    let medication: Medication = store.get(id)?;
    let logs = store.list::<MedicationLog>()?;

    let today = Local::now().date_naive();
    let now = Local::now().format("%H:%M").to_string();

    println!("{} {} — {}", medication.name, medication.dosage, medication.frequency);

    if medication.times.is_empty() {
        println!("  No dose slots scheduled.");
        return Ok(());
    }

    for (slot, status) in day_statuses(&medication, &logs, today) {
        println!("  {}  {}", slot, status_label(status));
    }

    if let Some(next) = next_dose(&medication.times, &now) {
        println!("  Next dose: {}", next);
    }

    Ok(())
}

fn cmd_med_take(store: &RecordStore, id: u32, slot: &str) -> Result<()> {
    // Confirm the medication exists and the slot belongs to its schedule
    let medication: Medication = store.get(id)?;
    if !medication.times.iter().any(|t| t == slot) {
        return Err(Error::Validation(format!(
            "'{}' is not a scheduled dose slot for {} (schedule: {})",
            slot,
            medication.name,
            medication.times.join(", ")
        )));
    }

    // A slot can only be taken while it is still pending; this is the sole
    // write path for logs, so it keeps at most one log per slot per day.
    let logs = store.list::<MedicationLog>()?;
    let today = Local::now().date_naive();
    let status = dose_status(medication.id, slot, &logs, today);
    if status != DoseStatus::Pending {
        return Err(Error::Validation(format!(
            "{} {} dose is already {} today",
            medication.name,
            slot,
            status_label(status)
        )));
    }

    let log = MedicationLog {
        id: 0,
        medication_id: medication.id,
        scheduled_time: slot.to_string(),
        taken_time: Some(Local::now().format("%H:%M").to_string()),
        status: DoseStatus::Taken,
        date: today,
    };

    let created = store.create(log)?;
    println!(
        "✓ Logged {} {} dose as taken (log {})",
        medication.name, slot, created.id
    );
    Ok(())
}

// ============================================================================
// Appointments
// ============================================================================

fn cmd_appt_list(store: &RecordStore, view: &str) -> Result<()> {
    let view = match view.to_lowercase().as_str() {
        "today" => AppointmentView::Today,
        "upcoming" => AppointmentView::Upcoming,
        "past" => AppointmentView::Past,
        "all" => AppointmentView::All,
        other => {
            eprintln!("Unknown view: {}. Showing upcoming.", other);
            AppointmentView::Upcoming
        }
    };

    let appointments = store.list::<Appointment>()?;
    let today = Local::now().date_naive();
    let selected = appointments_view(&appointments, view, today);

    if selected.is_empty() {
        println!("No appointments found.");
        return Ok(());
    }

    for appt in selected {
        println!(
            "[{}] {} {} — {} with {} at {} ({:?})",
            appt.id, appt.date, appt.time, appt.title, appt.provider, appt.location, appt.kind
        );
    }

    Ok(())
}

fn cmd_appt_add(store: &RecordStore, args: ApptAdd) -> Result<()> {
    let kind = parse_appointment_kind(&args.kind)?;

    let appointment = Appointment {
        id: 0,
        title: args.title,
        provider: args.provider,
        location: args.location,
        date: args.date,
        time: args.time,
        kind,
        notes: args.notes,
    };

    check_valid(registry::validate_appointment(&appointment))?;

    let created = store.create(appointment)?;
    println!("✓ Added appointment [{}] {}", created.id, created.title);
    Ok(())
}

fn cmd_appt_edit(store: &RecordStore, args: ApptEdit) -> Result<()> {
    let mut appointment: Appointment = store.get(args.id)?;

    if let Some(title) = args.title {
        appointment.title = title;
    }
    if let Some(provider) = args.provider {
        appointment.provider = provider;
    }
    if let Some(location) = args.location {
        appointment.location = location;
    }
    if let Some(date) = args.date {
        appointment.date = date;
    }
    if let Some(time) = args.time {
        appointment.time = time;
    }
    if let Some(ref kind) = args.kind {
        appointment.kind = parse_appointment_kind(kind)?;
    }
    if let Some(notes) = args.notes {
        appointment.notes = Some(notes);
    }

    check_valid(registry::validate_appointment(&appointment))?;

    let updated = store.update(args.id, appointment)?;
    println!("✓ Updated appointment [{}] {}", updated.id, updated.title);
    Ok(())
}

fn cmd_appt_remove(store: &RecordStore, id: u32) -> Result<()> {
    let deleted = store.delete::<Appointment>(id)?;
    println!("✓ Removed appointment [{}] {}", deleted.id, deleted.title);
    Ok(())
}

// ============================================================================
// Health metrics
// ============================================================================

fn cmd_metric_list(store: &RecordStore, kind: Option<&str>) -> Result<()> {
    let metrics = store.list::<HealthMetric>()?;

    let selected = match kind {
        Some(raw) => summary::readings_by_kind(&metrics, parse_metric_kind(raw)?),
        None => summary::recent_metrics(&metrics, usize::MAX),
    };

    if selected.is_empty() {
        println!("No readings found.");
        return Ok(());
    }

    for metric in selected {
        println!(
            "[{}] {} — {} {} ({}{})",
            metric.id,
            kind_info(metric.kind).label,
            metric.value,
            metric.unit,
            metric.date,
            metric.time.as_deref().map(|t| format!(" {}", t)).unwrap_or_default()
        );
    }

    Ok(())
}

fn cmd_metric_stats(store: &RecordStore, config: &Config) -> Result<()> {
    let metrics = store.list::<HealthMetric>()?;

    let mut printed = false;
    for info in metric_kinds() {
        if let Some(stats) = metric_stats(&metrics, info.kind, config.metrics.recent_readings) {
            let trend = match stats.trend {
                Some(MetricTrend::Up) => " ↑",
                Some(MetricTrend::Down) => " ↓",
                None => "",
            };
            println!(
                "{}: latest {} {}{}, avg {:.1}, {} readings",
                info.label, stats.latest_value, stats.unit, trend, stats.average, stats.count
            );
            printed = true;
        }
    }

    if !printed {
        println!("No readings recorded yet.");
    }

    Ok(())
}

fn cmd_metric_add(store: &RecordStore, args: MetricAdd) -> Result<()> {
    let kind = parse_metric_kind(&args.kind)?;

    let metric = HealthMetric {
        id: 0,
        kind,
        value: args.value,
        unit: args
            .unit
            .unwrap_or_else(|| kind_info(kind).default_unit.to_string()),
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        time: args.time,
        notes: args.notes,
    };

    check_valid(registry::validate_metric(&metric))?;

    let created = store.create(metric)?;
    println!(
        "✓ Recorded {} reading [{}]",
        kind_info(created.kind).label,
        created.id
    );
    Ok(())
}

fn cmd_metric_edit(store: &RecordStore, args: MetricEdit) -> Result<()> {
    let mut metric: HealthMetric = store.get(args.id)?;

    if let Some(ref kind) = args.kind {
        metric.kind = parse_metric_kind(kind)?;
    }
    if let Some(value) = args.value {
        metric.value = value;
    }
    if let Some(unit) = args.unit {
        metric.unit = unit;
    }
    if let Some(date) = args.date {
        metric.date = date;
    }
    if let Some(time) = args.time {
        metric.time = Some(time);
    }
    if let Some(notes) = args.notes {
        metric.notes = Some(notes);
    }

    check_valid(registry::validate_metric(&metric))?;

    let updated = store.update(args.id, metric)?;
    println!(
        "✓ Updated {} reading [{}]",
        kind_info(updated.kind).label,
        updated.id
    );
    Ok(())
}

fn cmd_metric_remove(store: &RecordStore, id: u32) -> Result<()> {
    let deleted = store.delete::<HealthMetric>(id)?;
    println!(
        "✓ Removed {} reading [{}]",
        kind_info(deleted.kind).label,
        deleted.id
    );
    Ok(())
}

// ============================================================================
// Export
// ============================================================================

fn cmd_export(store: &RecordStore, csv_path: &std::path::Path) -> Result<()> {
    let medications = store.list::<Medication>()?;
    let logs = store.list::<MedicationLog>()?;

    let count = export_logs(&medications, &logs, csv_path)?;

    if count == 0 {
        println!("No medication logs to export.");
    } else {
        println!("✓ Exported {} medication logs", count);
        println!("  CSV: {}", csv_path.display());
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn status_label(status: DoseStatus) -> &'static str {
    match status {
        DoseStatus::Taken => "taken",
        DoseStatus::Missed => "missed",
        DoseStatus::Pending => "pending",
    }
}

fn parse_appointment_kind(raw: &str) -> Result<AppointmentKind> {
    match raw.to_lowercase().as_str() {
        "routine" => Ok(AppointmentKind::Routine),
        "followup" | "follow-up" => Ok(AppointmentKind::Followup),
        "urgent" => Ok(AppointmentKind::Urgent),
        "specialist" => Ok(AppointmentKind::Specialist),
        "lab" => Ok(AppointmentKind::Lab),
        other => Err(Error::Validation(format!(
            "Unknown appointment kind: {} (expected routine, followup, urgent, specialist, lab)",
            other
        ))),
    }
}

fn parse_metric_kind(raw: &str) -> Result<MetricKind> {
    match raw.to_lowercase().as_str() {
        "blood_pressure" | "blood-pressure" | "bp" => Ok(MetricKind::BloodPressure),
        "glucose" => Ok(MetricKind::Glucose),
        "weight" => Ok(MetricKind::Weight),
        "temperature" => Ok(MetricKind::Temperature),
        "heart_rate" | "heart-rate" | "hr" => Ok(MetricKind::HeartRate),
        other => Err(Error::Validation(format!(
            "Unknown metric kind: {} (expected blood_pressure, glucose, weight, temperature, heart_rate)",
            other
        ))),
    }
}

fn check_valid(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    for error in &errors {
        eprintln!("  - {}", error);
    }
    Err(Error::Validation(errors.join("; ")))
}
