//! Municipality name lookup keyed by six-digit IBGE code.
//!
//! The reference table lists seven-digit IBGE codes (`codigo_ibge`) and names
//! (`nome`). Death records carry the six-digit form, which is the seven-digit
//! code without its check digit.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use reqwest::blocking::Client;

use crate::error::AppError;

pub const DEFAULT_MUNICIPIOS_URL: &str =
    "https://raw.githubusercontent.com/kelvins/Municipios-Brasileiros/main/csv/municipios.csv";

const CODE_COLUMN: &str = "codigo_ibge";
const NAME_COLUMN: &str = "nome";
const KEY_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct MunicipalityLookup {
    names: HashMap<String, String>,
}

impl MunicipalityLookup {
    /// Build from `(codigo_ibge, nome)` pairs. The first name seen for a key wins.
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: Into<String>,
    {
        let mut names = HashMap::new();
        for (code, name) in pairs {
            if let Some(key) = six_digit_key(code.as_ref()) {
                names.entry(key).or_insert_with(|| name.into());
            }
        }
        Self { names }
    }

    /// Parse the municipality CSV (comma-separated, UTF-8, with headers).
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::runtime(format!("Failed to read municipality CSV headers: {e}")))?
            .clone();

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
                .ok_or_else(|| AppError::runtime(format!("Municipality CSV is missing column `{name}`.")))
        };
        let code_idx = find(CODE_COLUMN)?;
        let name_idx = find(NAME_COLUMN)?;

        let mut pairs = Vec::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| AppError::runtime(format!("Invalid municipality CSV row: {e}")))?;
            let (Some(code), Some(name)) = (record.get(code_idx), record.get(name_idx)) else {
                continue;
            };
            pairs.push((code.to_string(), name.to_string()));
        }

        let lookup = Self::from_pairs(pairs);
        if lookup.is_empty() {
            return Err(AppError::runtime("Municipality CSV contained no usable rows."));
        }
        Ok(lookup)
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::input(format!("Failed to open municipality CSV '{}': {e}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }

    pub fn fetch(client: &Client, url: &str) -> Result<Self, AppError> {
        let body = crate::data::fetch_text(client, url)?;
        Self::from_csv_reader(body.as_bytes())
    }

    /// Name for a six-digit municipality code.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(code.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn six_digit_key(code: &str) -> Option<String> {
    let code = code.trim();
    let key = code.get(..KEY_LEN)?;
    if key.chars().all(|c| c.is_ascii_digit()) {
        Some(key.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
codigo_ibge,nome,latitude,longitude,capital,codigo_uf
5200050,Abadia de Goiás,-16.7573,-49.4412,0,52
3550308,São Paulo,-23.5329,-46.6395,1,35
1600303,Macapá,0.034934,-51.0694,1,16
";

    #[test]
    fn parses_reference_csv() {
        let lookup = MunicipalityLookup::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.name_for("355030"), Some("São Paulo"));
        assert_eq!(lookup.name_for(" 160030 "), Some("Macapá"));
        assert_eq!(lookup.name_for("3550308"), None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = MunicipalityLookup::from_csv_reader("codigo,nome\n1,x\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("codigo_ibge"));
    }

    #[test]
    fn short_or_non_numeric_codes_are_skipped() {
        let lookup = MunicipalityLookup::from_pairs([("123", "Curta"), ("ABCDEFG", "Letras"), ("3304557", "Rio de Janeiro")]);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.name_for("330455"), Some("Rio de Janeiro"));
    }
}
