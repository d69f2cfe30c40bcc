//! Command-line front end: argument parsing and CSV rendering.

use crate::comparison::{adjacent_comparisons, Comparison, RowComparison};
use crate::error::{Result, StoreError};
use crate::record::{RecordId, RecordInput, SettlementRecord};
use crate::repository::RecordRepository;
use crate::selection::Selection;
use crate::store::RecordStore;
use std::io::Write;
use std::path::PathBuf;

/// A parsed command.
#[derive(Debug, Clone)]
pub enum Command {
    /// Print every record with its change against the previous period.
    List,
    Add(RecordInput),
    Update(RecordId, RecordInput),
    Remove(RecordId),
    /// Compare the second record against the first.
    Compare(RecordId, RecordId),
    Clear,
}

/// Store location plus the command to run on it.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub command: Command,
}

impl Config {
    /// Parses `<store.csv> <command> [args...]` (program name excluded).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let store_path = args.first().ok_or(StoreError::MissingArgument("store file"))?;
        let command = Command::parse(&args[1..])?;
        Ok(Config {
            store_path: PathBuf::from(store_path),
            command,
        })
    }
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let name = args.first().ok_or(StoreError::MissingArgument("command"))?;
        let rest = &args[1..];

        match name.as_str() {
            "list" => Ok(Command::List),
            "add" => Ok(Command::Add(record_input(rest))),
            "update" => {
                let id = record_id(rest.first())?;
                Ok(Command::Update(id, record_input(&rest[1..])))
            }
            "remove" => Ok(Command::Remove(record_id(rest.first())?)),
            "compare" => Ok(Command::Compare(
                record_id(rest.first())?,
                record_id(rest.get(1))?,
            )),
            "clear" => Ok(Command::Clear),
            other => Err(StoreError::UnknownCommand(other.to_string())),
        }
    }
}

fn record_id(arg: Option<&String>) -> Result<RecordId> {
    let raw = arg.ok_or(StoreError::MissingArgument("record id"))?;
    raw.parse().map_err(|_| StoreError::InvalidNumber {
        field: "id",
        value: raw.clone(),
    })
}

/// `<start> <end> <cost> [quantity]`; absent positions become empty fields
/// and are reported by validation.
fn record_input(args: &[String]) -> RecordInput {
    let field = |i: usize| args.get(i).cloned().unwrap_or_default();
    let mut input = RecordInput::new(field(0), field(1), field(2));
    if let Some(quantity) = args.get(3) {
        input = input.with_quantity(quantity.clone());
    }
    input
}

/// Runs `command` against `store`, writing CSV output to `writer`.
///
/// Mutating commands print the resulting collection. If the store could not
/// be saved afterwards, the save is retried once and its error returned.
pub fn execute<R, W>(store: &mut RecordStore<R>, command: &Command, writer: W) -> Result<()>
where
    R: RecordRepository,
    W: Write,
{
    let records = match command {
        Command::List => store.list(),
        Command::Add(input) => store.add(input)?,
        Command::Update(id, input) => store.update(*id, input)?,
        Command::Remove(id) => store.remove(*id),
        Command::Clear => store.clear(),
        Command::Compare(first, second) => {
            let mut selection = Selection::new();
            for id in [first, second] {
                let record = store.get(*id).ok_or(StoreError::NotFound(*id))?;
                selection.select(record);
            }
            return write_selection(writer, &selection);
        }
    };

    if store.last_save_error().is_some() {
        store.flush()?;
    }

    write_rows(writer, &adjacent_comparisons(&records))
}

/// Writes each record with its adjacency comparison.
///
/// Change columns are empty for the first record, for untracked quantities,
/// and for percentages against a zero baseline.
pub fn write_rows<W: Write>(writer: W, rows: &[RowComparison]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "start_date",
        "end_date",
        "cost",
        "quantity",
        "cost_diff",
        "cost_change_pct",
        "cost_direction",
        "quantity_diff",
        "quantity_change_pct",
        "quantity_direction",
    ])?;

    for row in rows {
        let record = &row.record;
        let mut fields = vec![
            record.id.to_string(),
            record.start_date.to_string(),
            record.end_date.to_string(),
            record.cost.to_string(),
            optional(record.quantity),
        ];
        fields.extend(change_fields(row.comparison.as_ref()));
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the selection comparison: slot B measured against slot A.
pub fn write_selection<W: Write>(writer: W, selection: &Selection) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "baseline_id",
        "baseline_period",
        "compared_id",
        "compared_period",
        "cost_diff",
        "cost_change_pct",
        "cost_direction",
        "quantity_diff",
        "quantity_change_pct",
        "quantity_direction",
    ])?;

    if let (Some(baseline), Some(compared)) = (selection.slot_a(), selection.slot_b()) {
        let mut fields = vec![
            baseline.id.to_string(),
            period_label(baseline),
            compared.id.to_string(),
            period_label(compared),
        ];
        fields.extend(change_fields(selection.comparison().as_ref()));
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn change_fields(comparison: Option<&Comparison>) -> Vec<String> {
    match comparison {
        Some(comp) => vec![
            comp.cost_diff.to_string(),
            optional(comp.cost_change_percent),
            comp.cost_direction().as_str().to_string(),
            optional(comp.quantity_diff),
            optional(comp.quantity_change_percent),
            optional(comp.quantity_direction().map(|d| d.as_str())),
        ],
        None => vec![String::new(); 6],
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Formats a record's period, collapsing single-day periods to one date.
pub fn period_label(record: &SettlementRecord) -> String {
    if record.is_single_day() {
        record.start_date.to_string()
    } else {
        format!("{} ~ {}", record.start_date, record.end_date)
    }
}
