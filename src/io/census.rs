//! Census urban-infrastructure table ingest.
//!
//! The IBGE table lists one row per urban concentration (`City/UF`) with the
//! number of households (`Total`) and how many of them have paved roads,
//! public lighting and sidewalks. Spreadsheet exports carry title rows above
//! the header, so the header row is located by content rather than position.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::WINDOWS_1252;

use crate::classify::normalize_text;
use crate::domain::CensusArea;
use crate::error::AppError;

const COL_LABEL: &str = "Concentração Urbana";
const COL_TOTAL: &str = "Total";
const COL_PAVED: &str = "Via pavimentada - Existe";
const COL_LIGHTING: &str = "Existência de iluminação pública - Existe";
const COL_SIDEWALK: &str = "Existência de calçada / passeio - Existe";

/// A spreadsheet/CSV cell reduced to what the index needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value; text cells such as `-` or `X` (suppressed) are `None`.
    fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// Ingest output: parsed areas + row accounting.
#[derive(Debug, Clone)]
pub struct CensusIngest {
    pub areas: Vec<CensusArea>,
    /// Data rows below the header.
    pub rows_read: usize,
    /// Rows dropped because the label had no `/UF` part (totals, footnotes).
    pub rows_without_uf: usize,
}

/// Load the census table from a spreadsheet (first worksheet) or a CSV file.
pub fn load_census(path: &Path) -> Result<CensusIngest, AppError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let rows = if is_csv {
        read_csv_rows(path)?
    } else {
        read_workbook_rows(path)?
    };
    census_from_rows(rows)
}

/// Build areas from a grid of cells (header row anywhere in the grid).
pub fn census_from_rows(rows: Vec<Vec<Cell>>) -> Result<CensusIngest, AppError> {
    let label_key = normalize_header(COL_LABEL);
    let header_pos = rows
        .iter()
        .position(|row| row.iter().any(|c| c.text().is_some_and(|t| normalize_header(t) == label_key)))
        .ok_or_else(|| AppError::input(format!("Census table has no `{COL_LABEL}` header row.")))?;

    let header = &rows[header_pos];
    let find = |name: &str| -> Result<usize, AppError> {
        let key = normalize_header(name);
        header
            .iter()
            .position(|c| c.text().is_some_and(|t| normalize_header(t) == key))
            .ok_or_else(|| AppError::input(format!("Census table is missing required column `{name}`.")))
    };
    let label_idx = find(COL_LABEL)?;
    let total_idx = find(COL_TOTAL)?;
    let paved_idx = find(COL_PAVED)?;
    let lighting_idx = find(COL_LIGHTING)?;
    let sidewalk_idx = find(COL_SIDEWALK)?;

    let mut areas = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_without_uf = 0usize;

    for row in rows.iter().skip(header_pos + 1) {
        rows_read += 1;
        let get = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

        let Some((city, uf)) = get(label_idx).text().and_then(split_label) else {
            rows_without_uf += 1;
            continue;
        };

        let total = get(total_idx).number();
        let pct_paved = coverage_ratio(get(paved_idx).number(), total);
        let pct_lighting = coverage_ratio(get(lighting_idx).number(), total);
        let pct_sidewalk = coverage_ratio(get(sidewalk_idx).number(), total);

        areas.push(CensusArea {
            label: get(label_idx).text().unwrap_or_default().trim().to_string(),
            city,
            uf,
            pct_paved,
            pct_lighting,
            pct_sidewalk,
            infra_index: (pct_paved + pct_lighting + pct_sidewalk) / 3.0,
        });
    }

    if areas.is_empty() {
        return Err(AppError::no_data("Census table has no `City/UF` rows."));
    }

    Ok(CensusIngest {
        areas,
        rows_read,
        rows_without_uf,
    })
}

/// Split `"São Paulo/SP"` into `("São Paulo", "SP")`. Labels without `/` yield `None`.
pub fn split_label(label: &str) -> Option<(String, String)> {
    let (city, uf) = label.split_once('/')?;
    Some((city.trim().to_string(), uf.trim().to_string()))
}

/// `count / total`, with missing, zero-total and non-finite results mapped to 0.
pub fn coverage_ratio(count: Option<f64>, total: Option<f64>) -> f64 {
    match (count, total) {
        (Some(c), Some(t)) => {
            let r = c / t;
            if r.is_finite() { r } else { 0.0 }
        }
        _ => 0.0,
    }
}

fn normalize_header(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    let collapsed: Vec<&str> = name.split_whitespace().collect();
    normalize_text(&collapsed.join(" "))
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<Cell>>, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::input(format!("Failed to open census spreadsheet '{}': {e}", path.display()))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::input(format!("Census spreadsheet '{}' has no worksheet.", path.display())))?
        .map_err(|e| AppError::input(format!("Failed to read census worksheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<Cell>>, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to open census CSV '{}': {e}", path.display())))?;

    // SIDRA exports UTF-8; older downloads are Latin-1.
    let text = match std::str::from_utf8(&bytes) {
        Ok(s) => s.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(&bytes).0.into_owned(),
    };

    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::input(format!("Invalid census CSV row: {e}")))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// Delimiter of the header line, so title rows above it do not decide.
fn sniff_delimiter(text: &str) -> u8 {
    let label_key = normalize_header(COL_LABEL);
    let line = text
        .lines()
        .find(|l| normalize_header(l).contains(&label_key))
        .or_else(|| text.lines().find(|l| !l.trim().is_empty()))
        .unwrap_or_default();
    if line.contains(';') { b';' } else { b',' }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn header() -> Vec<Cell> {
        vec![
            text("Concentração Urbana"),
            text("Total"),
            text("Via pavimentada - Existe"),
            text("Existência de iluminação pública - Existe"),
            text("Existência de calçada / passeio - Existe"),
        ]
    }

    #[test]
    fn splits_labels() {
        assert_eq!(
            split_label("São Paulo/SP"),
            Some(("São Paulo".to_string(), "SP".to_string()))
        );
        assert_eq!(
            split_label(" Juazeiro do Norte / CE "),
            Some(("Juazeiro do Norte".to_string(), "CE".to_string()))
        );
        assert_eq!(
            split_label("Petrolina/PE - Juazeiro/BA"),
            Some(("Petrolina".to_string(), "PE - Juazeiro/BA".to_string()))
        );
        assert_eq!(split_label("Brasil"), None);
    }

    #[test]
    fn coverage_ratio_edge_cases() {
        assert!((coverage_ratio(Some(50.0), Some(200.0)) - 0.25).abs() < 1e-12);
        assert_eq!(coverage_ratio(None, Some(10.0)), 0.0);
        assert_eq!(coverage_ratio(Some(3.0), None), 0.0);
        assert_eq!(coverage_ratio(Some(0.0), Some(0.0)), 0.0);
        assert_eq!(coverage_ratio(Some(5.0), Some(0.0)), 0.0);
    }

    #[test]
    fn finds_header_below_title_rows_and_computes_index() {
        let rows = vec![
            vec![text("Tabela 6591 - Domicílios particulares permanentes")],
            vec![Cell::Empty],
            header(),
            vec![text("São Paulo/SP"), Cell::Number(1000.0), Cell::Number(900.0), Cell::Number(800.0), Cell::Number(700.0)],
            vec![text("Macapá/AP"), Cell::Number(100.0), Cell::Number(30.0), text("-"), Cell::Number(30.0)],
            vec![text("Fonte: IBGE - Censo Demográfico")],
        ];
        let ingest = census_from_rows(rows).unwrap();

        assert_eq!(ingest.rows_read, 3);
        assert_eq!(ingest.rows_without_uf, 1);
        assert_eq!(ingest.areas.len(), 2);

        let sp = &ingest.areas[0];
        assert_eq!(sp.city, "São Paulo");
        assert_eq!(sp.uf, "SP");
        assert!((sp.infra_index - 0.8).abs() < 1e-12);

        let ap = &ingest.areas[1];
        assert_eq!(ap.pct_lighting, 0.0);
        assert!((ap.infra_index - 0.2).abs() < 1e-12);
    }

    #[test]
    fn header_matching_ignores_accents_and_spacing() {
        let rows = vec![
            vec![
                text("CONCENTRACAO URBANA"),
                text(" Total "),
                text("Via  pavimentada - Existe"),
                text("Existencia de iluminacao publica - Existe"),
                text("Existencia de calcada / passeio - Existe"),
            ],
            vec![text("Belém/PA"), Cell::Number(10.0), Cell::Number(5.0), Cell::Number(5.0), Cell::Number(5.0)],
        ];
        let ingest = census_from_rows(rows).unwrap();
        assert!((ingest.areas[0].infra_index - 0.5).abs() < 1e-12);
    }

    #[test]
    fn missing_header_is_an_input_error() {
        let err = census_from_rows(vec![vec![text("Município")]]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let mut partial = header();
        partial.truncate(3);
        let err = census_from_rows(vec![partial]).unwrap_err();
        assert!(err.to_string().contains("iluminação"));
    }

    #[test]
    fn reads_semicolon_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabela6591.csv");
        std::fs::write(
            &path,
            "Concentração Urbana;Total;Via pavimentada - Existe;Existência de iluminação pública - Existe;Existência de calçada / passeio - Existe\n\
             Recife/PE;200;100;150;50\n",
        )
        .unwrap();

        let ingest = load_census(&path).unwrap();
        assert_eq!(ingest.areas.len(), 1);
        assert!((ingest.areas[0].infra_index - 0.5).abs() < 1e-12);
    }

    #[test]
    fn csv_title_row_does_not_decide_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabela6591.csv");
        std::fs::write(
            &path,
            "Tabela 6591 - Domicílios particulares permanentes, por existência de pavimentação\n\
             Concentração Urbana;Total;Via pavimentada - Existe;Existência de iluminação pública - Existe;Existência de calçada / passeio - Existe\n\
             Recife/PE;200;100;150;50\n",
        )
        .unwrap();

        let ingest = load_census(&path).unwrap();
        assert_eq!(ingest.rows_read, 1);
        assert_eq!(ingest.areas[0].city, "Recife");
        assert!((ingest.areas[0].infra_index - 0.5).abs() < 1e-12);
    }

    #[test]
    fn delimiter_sniffing() {
        assert_eq!(sniff_delimiter("Titulo\nConcentração Urbana;Total\n"), b';');
        assert_eq!(sniff_delimiter("Titulo; com ponto e vírgula\nConcentração Urbana,Total\n"), b',');
        assert_eq!(sniff_delimiter("a;b\n1;2\n"), b';');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn workbook_cells_map_to_census_cells() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Int(1200)), Cell::Number(1200.0));
        assert_eq!(cell_from_data(&Data::Float(0.5)), Cell::Number(0.5));
        assert_eq!(cell_from_data(&Data::String("Natal/RN".to_string())), text("Natal/RN"));

        let flag = cell_from_data(&Data::Bool(true));
        assert!(matches!(flag, Cell::Text(_)));
        assert_eq!(flag.number(), None);

        let err = cell_from_data(&Data::Error(calamine::CellErrorType::Div0));
        assert!(matches!(err, Cell::Text(_)));
        assert_eq!(err.number(), None);

        // Suppressed values come through as `-` text and count as zero coverage.
        let dash = cell_from_data(&Data::String("-".to_string()));
        assert_eq!(coverage_ratio(dash.number(), Some(10.0)), 0.0);
    }

    #[test]
    fn unreadable_workbook_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabela6591_con_urb.xlsx");
        std::fs::write(&path, "not a spreadsheet").unwrap();

        let err = load_census(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("census spreadsheet"));
    }
}
