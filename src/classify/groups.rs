//! Join cleaned records to municipality names and infrastructure groups.

use std::collections::{BTreeMap, HashMap};

use crate::classify::{InfraTiers, normalize_text};
use crate::data::MunicipalityLookup;
use crate::domain::{AnalyzedRecord, InfraGroup, MortalityRecord, UNKNOWN_MUNICIPALITY};

/// Joined records plus join diagnostics.
#[derive(Debug, Clone)]
pub struct WorkingTable {
    pub records: Vec<AnalyzedRecord>,
    /// Records dropped because their code had no municipality name (inner join).
    pub unmatched: usize,
    /// Whether names came from a lookup (false = `N/A` fallback).
    pub names_resolved: bool,
}

impl WorkingTable {
    pub fn group_sizes(&self) -> BTreeMap<InfraGroup, usize> {
        let mut sizes = BTreeMap::new();
        for r in &self.records {
            *sizes.entry(r.group).or_insert(0) += 1;
        }
        sizes
    }

    /// Ages of one group, as `f64` for the statistics helpers.
    pub fn ages(&self, group: Option<InfraGroup>) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| group.is_none_or(|g| r.group == g))
            .map(|r| r.record.age_years as f64)
            .collect()
    }
}

/// Attach names and groups to every record.
///
/// With a lookup, records are inner-joined on the six-digit code. Without one,
/// every record is kept with the `N/A` name (and so ends up unclassified).
pub fn build_working_table(
    records: Vec<MortalityRecord>,
    lookup: Option<&MunicipalityLookup>,
    tiers: &InfraTiers,
) -> WorkingTable {
    // Many records share a municipality; normalize each name once.
    let mut normalized: HashMap<String, (String, InfraGroup)> = HashMap::new();
    let mut resolve = |name: &str| -> (String, InfraGroup) {
        normalized
            .entry(name.to_string())
            .or_insert_with(|| {
                let norm = normalize_text(name);
                let group = tiers.classify(&norm);
                (norm, group)
            })
            .clone()
    };

    let mut out = Vec::with_capacity(records.len());
    let mut unmatched = 0usize;

    for record in records {
        let name = match lookup {
            Some(lookup) => match lookup.name_for(&record.municipality_code) {
                Some(name) => name.to_string(),
                None => {
                    unmatched += 1;
                    continue;
                }
            },
            None => UNKNOWN_MUNICIPALITY.to_string(),
        };

        let (name_norm, group) = resolve(&name);
        out.push(AnalyzedRecord {
            record,
            municipality_name: name,
            municipality_name_norm: name_norm,
            group,
        });
    }

    WorkingTable {
        records: out,
        unmatched,
        names_resolved: lookup.is_some(),
    }
}
