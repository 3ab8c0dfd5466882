//! Import readers for bank export formats
//!
//! Every reader turns one export file into normalized [`Record`]s with an
//! empty account; the journal assigns the target account when writing.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Record;

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Names accepted by [`reader_for`]
pub const READER_NAMES: &[&str] = &[
    "auto",
    "csv",
    "bulder",
    "morrow",
    "komplett",
    "norwegian",
    "dnb",
];

/// A source of normalized records
pub trait RecordReader {
    /// Read all records from the underlying input
    fn read(&mut self) -> Result<Vec<Record>>;
}

/// Select a reader by name.
///
/// `auto` picks one from the extension of `path`: `.csv` files use the
/// default CSV reader, `.json` files the Komplett reader and `.xlsx` files
/// the Norwegian reader.
pub fn reader_for<'a, R: Read + 'a>(
    name: &str,
    path: &Path,
    input: R,
) -> Result<Box<dyn RecordReader + 'a>> {
    let name = if name == "auto" {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => "csv",
            Some(ext) if ext.eq_ignore_ascii_case("json") => "komplett",
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => "norwegian",
            _ => return Err(Error::UnknownReader(path.display().to_string())),
        }
    } else {
        name
    };
    debug!("Using {} reader for {}", name, path.display());

    let reader: Box<dyn RecordReader + 'a> = match name {
        "csv" => Box::new(CsvReader::new(input)),
        "bulder" => Box::new(BulderReader::new(input)),
        "morrow" => Box::new(MorrowReader::new(input)),
        "komplett" => Box::new(KomplettReader::new(input)),
        "norwegian" => Box::new(NorwegianReader::new(input)),
        "dnb" => Box::new(DnbReader::new(input)),
        other => return Err(Error::UnknownReader(other.to_string())),
    };
    Ok(reader)
}

/// Read the whole input, dropping a leading UTF-8 byte order mark
fn read_input<R: Read>(mut input: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    if data.starts_with(BYTE_ORDER_MARK) {
        data.drain(..BYTE_ORDER_MARK.len());
    }
    Ok(data)
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn parse_date(line: usize, s: &str, fmt: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), fmt).map_err(|_| Error::parse(line, "date", s))
}

/// Parse an amount in minor units by dropping every character in `separators`
///
/// `"1.337,00"` with separators `.,` becomes `133700`.
fn parse_minor_units(line: usize, field: &'static str, s: &str, separators: &[char]) -> Result<i64> {
    let cleaned: String = s.trim().chars().filter(|c| !separators.contains(c)).collect();
    cleaned.parse().map_err(|_| Error::parse(line, field, s))
}

/// Default bank export: semicolon separated, no header
///
/// Columns: `date (DD.MM.YYYY); date; text; amount; balance; ...`. Rows with
/// fewer than four columns are skipped.
pub struct CsvReader<R> {
    input: Option<R>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

impl<R: Read> RecordReader for CsvReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let data = read_input(input)?;
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            if row.len() < 4 {
                continue;
            }
            let line = line_of(&row);
            let time = parse_date(line, &row[0], "%d.%m.%Y")?;
            let amount = parse_minor_units(line, "amount", &row[3], &['.', ','])?;
            let mut record = Record::new(time, &row[2], amount);
            if let Some(balance) = row.get(4).filter(|b| !b.trim().is_empty()) {
                record.balance = Some(parse_minor_units(line, "balance", balance, &['.', ','])?);
            }
            records.push(record);
        }

        debug!("Parsed {} CSV records", records.len());
        Ok(records)
    }
}

/// Bulder bank export: semicolon separated with a header row
///
/// The column layout has changed several times, so columns are looked up by
/// header name. Text is made from the transaction type, the description and
/// the two category columns.
pub struct BulderReader<R> {
    input: Option<R>,
}

impl<R: Read> BulderReader<R> {
    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

struct BulderColumns {
    date: usize,
    amount_in: usize,
    amount_out: usize,
    balance: Option<usize>,
    text: Vec<usize>,
}

impl BulderColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();
        let required = |name: &'static str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| Error::parse(1, "header", name))
        };
        let description = index.get("Tekst").or_else(|| index.get("Tekst/KID")).copied();
        let text = [
            index.get("Type").copied(),
            description,
            index.get("Hovedkategori").copied(),
            index.get("Underkategori").copied(),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            date: required("Dato")?,
            amount_in: required("Inn på konto")?,
            amount_out: required("Ut fra konto")?,
            balance: index.get("Balanse").copied(),
            text,
        })
    }
}

impl<R: Read> RecordReader for BulderReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let data = read_input(input)?;
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let columns = BulderColumns::from_headers(rdr.headers()?)?;
        let cell = |row: &StringRecord, i: usize| row.get(i).unwrap_or("").trim().to_string();
        let separators = ['.', ','];

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let line = line_of(&row);
            let time = parse_date(line, &cell(&row, columns.date), "%Y-%m-%d")?;

            let mut amount = cell(&row, columns.amount_in);
            if amount.is_empty() {
                amount = cell(&row, columns.amount_out);
            }
            let amount = parse_minor_units(line, "amount", &amount, &separators)?;

            let text = columns
                .text
                .iter()
                .map(|i| cell(&row, *i))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(",");

            let mut record = Record::new(time, text, amount);
            if let Some(i) = columns.balance {
                let balance = cell(&row, i);
                if !balance.is_empty() {
                    record.balance = Some(parse_minor_units(line, "balance", &balance, &separators)?);
                }
            }
            records.push(record);
        }

        debug!("Parsed {} Bulder records", records.len());
        Ok(records)
    }
}

/// Morrow bank export: comma separated with a header row
///
/// Columns used: date (DD.MM.YYYY, possibly followed by a time of day) in
/// column 0, text in column 2 and amount in column 5. Rows carry one more
/// field than the header; rows with fewer than ten fields are skipped.
pub struct MorrowReader<R> {
    input: Option<R>,
}

impl<R: Read> MorrowReader<R> {
    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

impl<R: Read> RecordReader for MorrowReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let data = read_input(input)?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            if row.len() < 10 {
                continue;
            }
            let line = line_of(&row);
            let date = row[0].split_whitespace().next().unwrap_or("");
            let time = parse_date(line, date, "%d.%m.%Y")?;
            let amount = parse_minor_units(line, "amount", &row[5], &['.'])?;
            records.push(Record::new(time, row[2].trim(), amount));
        }

        debug!("Parsed {} Morrow records", records.len());
        Ok(records)
    }
}

/// Komplett Bank card export: a JSON array of transactions
///
/// The field names differ between versions of the export, so each value is
/// taken from the first spelling that is present.
pub struct KomplettReader<R> {
    input: Option<R>,
    clean: Regex,
    separator: Regex,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct KomplettEntry {
    formatted_posting_date: Option<String>,
    transaction_date: Option<String>,
    billing_amount: Option<Value>,
    formatted_amount: Option<Value>,
    display_description: Option<String>,
    merchant_name: Option<String>,
    description: Option<String>,
}

impl<R: Read> KomplettReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Some(input),
            clean: Regex::new(r#"kr|NOK|"|\s+|\p{Z}+"#).expect("valid regex"),
            separator: Regex::new("[.,]").expect("valid regex"),
        }
    }

    /// Parse amounts like `"1 337,5 kr"` or `-997.4` into minor units
    fn parse_amount(&self, entry: usize, value: &Value) -> Result<i64> {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let text = self.clean.replace_all(&raw, "");
        let parts: Vec<&str> = self.separator.split(&text).collect();
        let mut digits = parts[0].to_string();
        if parts.len() == 2 {
            digits.push_str(parts[1]);
            if parts[1].len() == 1 {
                digits.push('0');
            }
        } else {
            digits.push_str("00");
        }
        digits.parse().map_err(|_| Error::parse(entry, "amount", raw))
    }
}

fn first_present<'a>(values: &[&'a Option<String>]) -> Option<&'a str> {
    values
        .iter()
        .copied()
        .flatten()
        .map(|s| s.as_str())
        .find(|s| !s.is_empty())
}

impl<R: Read> RecordReader for KomplettReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let data = read_input(input)?;
        let entries: Vec<KomplettEntry> = serde_json::from_slice(&data)?;

        let mut records = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let n = i + 1;

            let date = first_present(&[&entry.formatted_posting_date, &entry.transaction_date])
                .ok_or_else(|| Error::parse(n, "date", ""))?;
            let time = parse_date(n, date, "%d.%m.%Y")?;

            let mut amount = 0;
            for value in [&entry.billing_amount, &entry.formatted_amount]
                .into_iter()
                .flatten()
            {
                amount = self.parse_amount(n, value)?;
                if amount != 0 {
                    break;
                }
            }

            let text = first_present(&[
                &entry.display_description,
                &entry.merchant_name,
                &entry.description,
            ])
            .unwrap_or("");

            records.push(Record::new(time, text, amount));
        }

        debug!("Parsed {} Komplett records", records.len());
        Ok(records)
    }
}

/// First worksheet of an XLSX workbook
fn read_sheet<R: Read>(input: R) -> Result<Range<Data>> {
    let data = read_input(input)?;
    let mut workbook = Xlsx::new(Cursor::new(data))?;
    let sheet = workbook.worksheet_range_at(0).ok_or(Error::EmptyWorkbook)??;
    Ok(sheet)
}

/// Rows of `sheet` with their 1-based line in the workbook
fn sheet_rows(sheet: &Range<Data>) -> impl Iterator<Item = (usize, &[Data])> {
    let first = sheet.start().map_or(0, |(row, _)| row as usize);
    sheet
        .rows()
        .enumerate()
        .map(move |(i, row)| (first + i + 1, row))
}

/// Number of cells up to the last non-empty one
fn filled_len(row: &[Data]) -> usize {
    row.iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map_or(0, |i| i + 1)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Date from a date-formatted cell, a day serial or text in `fmt`
fn cell_date(line: usize, cell: &Data, fmt: &str) -> Result<NaiveDate> {
    let serial = match cell {
        Data::DateTime(dt) => dt.as_f64(),
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => return parse_date(line, s, fmt),
        other => return Err(Error::parse(line, "date", other.to_string())),
    };
    // Spreadsheet day serials count from 1899-12-30
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.floor() as i64)))
        .ok_or_else(|| Error::parse(line, "date", serial.to_string()))
}

/// Parse a spreadsheet amount into minor units
///
/// `.` separates decimals and `,` groups thousands. A single decimal digit
/// is padded (`-1199.9` is `-119990`) and whole numbers are whole units
/// (`700` is `70000`).
fn parse_sheet_amount(line: usize, field: &'static str, s: &str) -> Result<i64> {
    let mut s = s.trim().to_string();
    if s.rfind('.').is_some_and(|i| i + 2 == s.len()) {
        s.push('0');
    }
    let units = parse_minor_units(line, field, &s, &['.', ','])?;
    Ok(if s.contains('.') { units } else { units * 100 })
}

/// Norwegian (Bank Norwegian) credit card export: an XLSX workbook
///
/// The header row starts with `TransactionDate`. Dates are `MM-DD-YY` in
/// column 0, text is in column 1 and the amount in column 6. Rows with
/// fewer than seven cells or an empty first cell are skipped.
pub struct NorwegianReader<R> {
    input: Option<R>,
}

impl<R: Read> NorwegianReader<R> {
    const HEADER: &'static str = "TransactionDate";

    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

impl<R: Read> RecordReader for NorwegianReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let sheet = read_sheet(input)?;

        let mut records = Vec::new();
        for (line, row) in sheet_rows(&sheet) {
            if filled_len(row) < 7 {
                continue;
            }
            let first = cell_text(&row[0]);
            if first.is_empty() || first == Self::HEADER {
                continue;
            }
            let time = cell_date(line, &row[0], "%m-%d-%y")?;
            let amount = parse_sheet_amount(line, "amount", &cell_text(&row[6]))?;
            records.push(Record::new(time, cell_text(&row[1]), amount));
        }

        debug!("Parsed {} Norwegian records", records.len());
        Ok(records)
    }
}

/// DNB account export: an XLSX workbook
///
/// The header row starts with `Dato`. Text is in column 1, money in is in
/// column 4 and money out in column 5; the amount is in minus out, where an
/// empty cell counts as zero. Dates are date cells or `DD.MM.YYYY` text.
pub struct DnbReader<R> {
    input: Option<R>,
}

impl<R: Read> DnbReader<R> {
    const HEADER: &'static str = "Dato";

    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

impl<R: Read> RecordReader for DnbReader<R> {
    fn read(&mut self) -> Result<Vec<Record>> {
        let Some(input) = self.input.take() else {
            return Ok(Vec::new());
        };
        let sheet = read_sheet(input)?;
        let amount = |line, field, cell: &Data| {
            let text = cell_text(cell);
            if text.is_empty() {
                Ok(0)
            } else {
                parse_sheet_amount(line, field, &text)
            }
        };

        let mut records = Vec::new();
        for (line, row) in sheet_rows(&sheet) {
            if row.len() < 6 {
                continue;
            }
            let first = cell_text(&row[0]);
            if first.is_empty() || first == Self::HEADER {
                continue;
            }
            let time = cell_date(line, &row[0], "%d.%m.%Y")?;
            let amount_in = amount(line, "inbound amount", &row[4])?;
            let amount_out = amount(line, "outbound amount", &row[5])?;
            records.push(Record::new(time, cell_text(&row[1]), amount_in - amount_out));
        }

        debug!("Parsed {} DNB records", records.len());
        Ok(records)
    }
}
