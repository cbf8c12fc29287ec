use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, builder::Builder};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use amortization_table::{
    AmortizationSchedule, CalculatorConfig, RateCurve, RatePoint, build_schedule, interpolate_range,
    write_csv, write_rates_csv,
};

/// Amortization tables with balloon payments, and rate curve interpolation
#[derive(Parser)]
#[command(name = "amort", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an amortization schedule, flagging any balloon due at maturity
    Schedule(ScheduleArgs),
    /// Interpolate rates between known (period, rate) points
    Interpolate(InterpolateArgs),
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Args)]
struct ScheduleArgs {
    /// TOML file with default inputs (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Amount borrowed
    #[arg(long)]
    principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 5.4)
    #[arg(long)]
    rate_percent: Option<Decimal>,

    /// Amortization term in months
    #[arg(long)]
    amortization_months: Option<u32>,

    /// Maturity term in months
    #[arg(long)]
    maturity_months: Option<u32>,

    /// Payments per year (12, 24, 26, 52, ...)
    #[arg(long)]
    payments_per_year: Option<u32>,

    /// Keep full precision instead of rounding to cents
    #[arg(long)]
    no_round: bool,

    /// Also write the schedule as CSV to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct InterpolateArgs {
    /// Known point as PERIOD:RATE, rate in percent or decimal (repeatable)
    #[arg(long = "point", value_parser = parse_point, required = true)]
    points: Vec<(Decimal, Decimal)>,

    /// First period to sample (defaults to the first known period)
    #[arg(long, allow_hyphen_values = true)]
    start: Option<Decimal>,

    /// Last period to sample (defaults to the last known period)
    #[arg(long, allow_hyphen_values = true)]
    end: Option<Decimal>,

    /// Distance between samples
    #[arg(long, default_value = "1")]
    step: Decimal,
}

fn parse_point(s: &str) -> Result<(Decimal, Decimal), String> {
    let (period, rate) = s
        .split_once(':')
        .ok_or_else(|| format!("expected PERIOD:RATE, got '{s}'"))?;
    let period = period
        .trim()
        .parse()
        .map_err(|e| format!("bad period '{period}': {e}"))?;
    let rate = rate
        .trim()
        .parse()
        .map_err(|e| format!("bad rate '{rate}': {e}"))?;
    Ok((period, rate))
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Schedule(args) => run_schedule(args, &cli.output),
        Commands::Interpolate(args) => run_interpolate(args, &cli.output),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run_schedule(args: ScheduleArgs, output: &OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => CalculatorConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CalculatorConfig::default(),
    };
    if let Some(v) = args.principal {
        config.principal = v;
    }
    if let Some(v) = args.rate_percent {
        config.annual_rate_percent = v;
    }
    if let Some(v) = args.amortization_months {
        config.amortization_months = v;
    }
    if let Some(v) = args.maturity_months {
        config.maturity_months = v;
    }
    if let Some(v) = args.payments_per_year {
        config.payments_per_year = v;
    }
    if args.no_round {
        config.round_to_cents = false;
    }

    let schedule = build_schedule(&config.loan_terms(), config.round_to_cents)?;
    info!(rows = schedule.row_count(), "schedule ready");

    if let Some(path) = &args.out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_csv(BufWriter::new(file), &schedule.rows)?;
    }

    match output {
        OutputFormat::Table => print_schedule_table(&schedule),
        OutputFormat::Csv => write_csv(io::stdout().lock(), &schedule.rows)?,
        OutputFormat::Json => {
            let value = json!({
                "summary": schedule.summary(),
                "rows": schedule.rows,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn print_schedule_table(schedule: &AmortizationSchedule) {
    let summary = schedule.summary();
    println!("Periodic Payment:               {:.2}", summary.payment);
    println!("Total Interest Paid to Maturity: {:.2}", summary.interest_to_maturity);
    println!("Balloon Payment at Maturity:     {:.2}", summary.balloon_at_maturity);
    println!("Periods Listed:                  {}", summary.periods_listed);
    println!();

    let mut builder = Builder::default();
    builder.push_record(["period", "payment", "interest", "principal", "balance_end", "balloon_due"]);
    for row in &schedule.rows {
        builder.push_record([
            row.period.to_string(),
            row.payment.to_string(),
            row.interest.to_string(),
            row.principal.to_string(),
            row.balance_end.to_string(),
            row.balloon_due.to_string(),
        ]);
    }
    println!("{}", Table::from(builder));
}

fn run_interpolate(args: InterpolateArgs, output: &OutputFormat) -> anyhow::Result<()> {
    let (periods, rates): (Vec<Decimal>, Vec<Decimal>) = args.points.into_iter().unzip();
    let curve = RateCurve::new(&periods, &rates)?;
    let start = args.start.unwrap_or(curve.min_period());
    let end = args.end.unwrap_or(curve.max_period());
    let points = interpolate_range(&curve, start, end, args.step)?;

    match output {
        OutputFormat::Table => print_rates_table(&points),
        OutputFormat::Csv => write_rates_csv(io::stdout().lock(), &points)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&points)?),
    }
    Ok(())
}

fn print_rates_table(points: &[RatePoint]) {
    let mut builder = Builder::default();
    builder.push_record(["period", "rate_decimal", "rate_percent"]);
    for p in points {
        builder.push_record([
            p.period.to_string(),
            p.rate_decimal.round_dp(6).to_string(),
            p.rate_percent.round_dp(4).to_string(),
        ]);
    }
    println!("{}", Table::from(builder));
}
