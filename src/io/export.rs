//! Export the joined working table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::AnalyzedRecord;
use crate::error::AppError;

const HEADER: [&str; 11] = [
    "cod_municipio",
    "nome_municipio",
    "nome_municipio_norm",
    "grupo_infra",
    "idade_anos",
    "causabas",
    "capitulo_cid",
    "sexo",
    "racacor",
    "estciv",
    "esc",
];

/// Write one row per analyzed record.
pub fn write_records_csv(path: &Path, records: &[AnalyzedRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        let rec = &r.record;
        let age = rec.age_years.to_string();
        let chapter = rec.cid_chapter.to_string();
        writer
            .write_record([
                rec.municipality_code.as_str(),
                r.municipality_name.as_str(),
                r.municipality_name_norm.as_str(),
                r.group.label(),
                age.as_str(),
                rec.cause_code.as_str(),
                chapter.as_str(),
                rec.sex.as_str(),
                rec.race.as_deref().unwrap_or(""),
                rec.marital_status.as_deref().unwrap_or(""),
                rec.schooling.as_deref().unwrap_or(""),
            ])
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
