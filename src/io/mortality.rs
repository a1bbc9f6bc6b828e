//! Death-record CSV ingest and cleaning.
//!
//! DATASUS death declarations are `;`-separated and Latin-1 encoded. We stream
//! raw byte records and decode only the handful of columns we keep, so a
//! national file never has to be transcoded up front.
//!
//! Row rules:
//! - `IDADE` is a coded age: first digit is the unit, the rest the amount.
//!   Only unit `4` (years) yields an age.
//! - Rows without an age, cause, sex or municipality code are dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;

use crate::domain::MortalityRecord;
use crate::error::AppError;

const COL_CAUSE: &str = "CAUSABAS";
const COL_AGE: &str = "IDADE";
const COL_SEX: &str = "SEXO";
const COL_RACE: &str = "RACACOR";
const COL_MARITAL: &str = "ESTCIV";
const COL_SCHOOLING: &str = "ESC";
const COL_MUNICIPALITY: &str = "CODMUNRES";

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_CAUSE,
    COL_AGE,
    COL_SEX,
    COL_RACE,
    COL_MARITAL,
    COL_SCHOOLING,
    COL_MUNICIPALITY,
];

/// Age unit digit meaning "years" in the `IDADE` code.
const AGE_UNIT_YEARS: char = '4';

/// Keep at most this many row-level parse errors for reporting.
const MAX_ROW_ERRORS: usize = 20;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Why rows were dropped. Each row counts once, under its first failing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub no_age: usize,
    pub no_cause: usize,
    pub no_sex: usize,
    pub no_municipality: usize,
    pub malformed: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.no_age + self.no_cause + self.no_sex + self.no_municipality + self.malformed
    }
}

/// Ingest output: cleaned records + row accounting.
#[derive(Debug, Clone)]
pub struct MortalityIngest {
    pub records: Vec<MortalityRecord>,
    pub rows_read: usize,
    pub dropped: DropCounts,
    pub row_errors: Vec<RowError>,
}

impl MortalityIngest {
    /// Rows that passed cleaning, even after `records` has been moved out.
    pub fn kept(&self) -> usize {
        self.rows_read - self.dropped.total()
    }
}

pub fn load_mortality(path: &Path) -> Result<MortalityIngest, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open mortality CSV '{}': {e}", path.display()))
    })?;
    read_mortality(file)
}

pub fn read_mortality<R: Read>(reader: R) -> Result<MortalityIngest, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .byte_headers()
        .map_err(|e| AppError::input(format!("Failed to read mortality CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::input(format!(
            "Mortality CSV is missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let columns = Columns::resolve(&header_map);

    let mut records = Vec::new();
    let mut dropped = DropCounts::default();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut record = ByteRecord::new();

    loop {
        // +2: one for the header line, one because lines are 1-based.
        let line = rows_read + 2;
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                rows_read += 1;
                dropped.malformed += 1;
                if row_errors.len() < MAX_ROW_ERRORS {
                    row_errors.push(RowError {
                        line,
                        message: format!("CSV parse error: {e}"),
                    });
                }
                // A broken UTF-8/quote sequence can leave the reader at EOF.
                if reader.is_done() {
                    break;
                }
                continue;
            }
        }
        rows_read += 1;

        match clean_row(&record, &columns) {
            Ok(r) => records.push(r),
            Err(reason) => reason.count(&mut dropped),
        }
    }

    Ok(MortalityIngest {
        records,
        rows_read,
        dropped,
        row_errors,
    })
}

/// Parse a coded `IDADE` value into whole years.
///
/// `"465"` -> `Some(65)`; `"312"` (months) -> `None`; `"4"` -> `None`.
pub fn parse_age_years(code: &str) -> Option<u32> {
    let code = code.trim();
    let rest = code.strip_prefix(AGE_UNIT_YEARS)?;
    rest.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    NoAge,
    NoCause,
    NoSex,
    NoMunicipality,
}

impl DropReason {
    fn count(self, counts: &mut DropCounts) {
        match self {
            DropReason::NoAge => counts.no_age += 1,
            DropReason::NoCause => counts.no_cause += 1,
            DropReason::NoSex => counts.no_sex += 1,
            DropReason::NoMunicipality => counts.no_municipality += 1,
        }
    }
}

struct Columns {
    cause: usize,
    age: usize,
    sex: usize,
    race: usize,
    marital: usize,
    schooling: usize,
    municipality: usize,
}

impl Columns {
    // Callers check REQUIRED_COLUMNS first.
    fn resolve(header_map: &HashMap<String, usize>) -> Self {
        let idx = |name: &str| header_map.get(name).copied().unwrap_or(usize::MAX);
        Self {
            cause: idx(COL_CAUSE),
            age: idx(COL_AGE),
            sex: idx(COL_SEX),
            race: idx(COL_RACE),
            marital: idx(COL_MARITAL),
            schooling: idx(COL_SCHOOLING),
            municipality: idx(COL_MUNICIPALITY),
        }
    }
}

fn clean_row(record: &ByteRecord, columns: &Columns) -> Result<MortalityRecord, DropReason> {
    let age_years = field(record, columns.age)
        .and_then(|s| parse_age_years(&s))
        .ok_or(DropReason::NoAge)?;
    let cause_code = field(record, columns.cause).ok_or(DropReason::NoCause)?;
    let sex = field(record, columns.sex).ok_or(DropReason::NoSex)?;
    let municipality_code = field(record, columns.municipality).ok_or(DropReason::NoMunicipality)?;

    let cid_chapter = cause_code.chars().next().ok_or(DropReason::NoCause)?;

    Ok(MortalityRecord {
        cid_chapter,
        cause_code,
        age_years,
        sex,
        race: field(record, columns.race),
        marital_status: field(record, columns.marital),
        schooling: field(record, columns.schooling),
        municipality_code,
    })
}

/// Decode a Latin-1 field; empty values are `None`.
fn field(record: &ByteRecord, idx: usize) -> Option<String> {
    let raw = record.get(idx)?;
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(raw);
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn build_header_map(headers: &ByteRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let (name, _) = WINDOWS_1252.decode_without_bom_handling(raw);
            // Spreadsheet exports sometimes prefix the first header with a BOM,
            // which Latin-1 decodes as "ï»¿".
            let name = name.trim().trim_start_matches('\u{feff}').trim_start_matches("ï»¿");
            (name.to_ascii_uppercase(), idx)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "\"ORIGEM\";\"TIPOBITO\";\"CAUSABAS\";\"IDADE\";\"SEXO\";\"RACACOR\";\"ESTCIV\";\"ESC\";\"CODMUNRES\"";

    fn csv(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        s.push('\n');
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s
    }

    #[test]
    fn age_code_parsing() {
        assert_eq!(parse_age_years("465"), Some(65));
        assert_eq!(parse_age_years("401"), Some(1));
        assert_eq!(parse_age_years(" 499 "), Some(99));
        assert_eq!(parse_age_years("312"), None);
        assert_eq!(parse_age_years("505"), None);
        assert_eq!(parse_age_years("4"), None);
        assert_eq!(parse_age_years("4ab"), None);
        assert_eq!(parse_age_years(""), None);
    }

    #[test]
    fn cleans_and_counts_rows() {
        let data = csv(&[
            "1;2;I219;465;1;1;2;3;355030",
            "1;2;C509;480;2;;;;330455",
            "1;2;P071;310;1;1;;;355030",
            "1;2;;470;1;1;;;355030",
            "1;2;J189;470;;1;;;355030",
            "1;2;J189;470;1;1;;;",
        ]);
        let ingest = read_mortality(data.as_bytes()).unwrap();

        assert_eq!(ingest.rows_read, 6);
        assert_eq!(ingest.records.len(), 2);
        assert_eq!(ingest.kept(), 2);
        assert_eq!(
            ingest.dropped,
            DropCounts {
                no_age: 1,
                no_cause: 1,
                no_sex: 1,
                no_municipality: 1,
                malformed: 0,
            }
        );

        let first = &ingest.records[0];
        assert_eq!(first.age_years, 65);
        assert_eq!(first.cid_chapter, 'I');
        assert_eq!(first.cause_code, "I219");
        assert_eq!(first.municipality_code, "355030");
        assert_eq!(first.race.as_deref(), Some("1"));

        let second = &ingest.records[1];
        assert_eq!(second.cid_chapter, 'C');
        assert_eq!(second.race, None);
        assert_eq!(second.schooling, None);
    }

    #[test]
    fn missing_columns_are_reported() {
        let data = "CAUSABAS;IDADE;SEXO\nI219;465;1\n";
        let err = read_mortality(data.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("CODMUNRES"));
    }

    #[test]
    fn decodes_latin1_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DO.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"CAUSABAS;IDADE;SEXO;RACACOR;ESTCIV;ESC;CODMUNRES;OBS\n").unwrap();
        // 0xE3 is "ã" in Latin-1 and invalid as UTF-8.
        file.write_all(b"X599;472;2;4;1;2;150140;n\xe3o\n").unwrap();
        drop(file);

        let ingest = load_mortality(&path).unwrap();
        assert_eq!(ingest.records.len(), 1);
        assert_eq!(ingest.records[0].age_years, 72);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_mortality(Path::new("/nonexistent/DO22OPEN.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
