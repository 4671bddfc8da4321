#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use bootstrap::{AppConfig, init_logging};
use std::{borrow::Cow, env, process};
use tabilog_application::{LedgerProcessor, SnapshotError, TripSnapshot, TripSnapshotSource};
use tabilog_domain::BaseCurrency;
use tabilog_i18n as i18n;
use tabilog_infrastructure::{
    DefaultRateTable, FallbackRateSource, JsonTripSnapshotSource, PinnedRateTable,
};
use tabilog_presentation::{SettlementPresenter, SummaryPresenter};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();
    if let Err(err) = run() {
        tracing::error!(error = %err, "tabilog failed");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        return Err("Usage: tabilog <trip.json> [member]".into());
    };
    let member = args.next();

    let config = AppConfig::from_env().map_err(|err| err.to_string())?;

    let rates = FallbackRateSource::new(
        PinnedRateTable::new(config.pinned_rates.iter().cloned()),
        DefaultRateTable,
    );
    let source = JsonTripSnapshotSource::new(&path, config.base.clone(), rates);
    let snapshot = source.load().map_err(|err| describe_load_error(&path, err))?;

    let processor = LedgerProcessor::new(config.base.clone(), config.settlement_context());
    match member {
        Some(member) => print_breakdown(&processor, &snapshot, &config.base, &member),
        None => {
            print_report(&processor, &snapshot, &config.base);
            Ok(())
        }
    }
}

fn describe_load_error(path: &str, err: SnapshotError) -> Cow<'static, str> {
    match err {
        SnapshotError::InvalidExpense { index, source } => {
            i18n::invalid_expense(index, source).into()
        }
        other => i18n::failed_to_load_trip(path, other).into(),
    }
}

fn print_report(processor: &LedgerProcessor, snapshot: &TripSnapshot, base: &BaseCurrency) {
    let report = processor.process(snapshot);
    let directory = snapshot.directory();

    let settlement = SettlementPresenter::render_with_members(&report, base, &directory);
    println!("{}", heading(i18n::BALANCES_HEADING, &snapshot.name));
    print!("{}", settlement.balance_table);
    println!();
    println!("{}", heading(i18n::SETTLEMENT_HEADING, &snapshot.name));
    match settlement.transfer_table {
        Some(table) => print!("{table}"),
        None => println!("{}", i18n::ALL_SETTLED),
    }

    let summary = SummaryPresenter::render_with_members(&report.summary, base, &directory);
    println!();
    println!("{}", heading(i18n::SUMMARY_HEADING, &snapshot.name));
    print!("{}", summary.member_table);
    println!();
    print!("{}", summary.category_table);
    if let Some(budget_line) = summary.budget_line {
        println!();
        println!("{budget_line}");
    }
}

fn print_breakdown(
    processor: &LedgerProcessor,
    snapshot: &TripSnapshot,
    base: &BaseCurrency,
    member: &str,
) -> CliResult<()> {
    let Some(breakdown) = processor.breakdown(snapshot, member) else {
        return Err(format!("'{member}' is not on the trip roster").into());
    };
    let directory = snapshot.directory();

    println!("{}", heading(i18n::MEMBER, member));
    print!(
        "{}",
        SummaryPresenter::build_breakdown_table(&breakdown, base, &directory)
    );
    Ok(())
}

fn heading(title: &str, trip: &str) -> String {
    if trip.is_empty() {
        format!("== {title} ==")
    } else {
        format!("== {title}: {trip} ==")
    }
}
