//! Reporting utilities: group comparisons, CID chapter breakdowns and per-state
//! aggregates, plus their terminal formatting (`format`).

use std::collections::{BTreeMap, HashMap};

use crate::classify::WorkingTable;
use crate::domain::{CensusArea, InfraGroup, uf_for_state_code};
use crate::math::{WelchTTest, mean, percentage, welch_t_test};

pub mod format;

pub use format::*;

/// Size and mean age of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group: InfraGroup,
    pub deaths: usize,
    /// `NaN` for an empty group.
    pub mean_age: f64,
}

/// Better vs worse infrastructure, with Welch's t-test on age at death.
#[derive(Debug, Clone)]
pub struct GroupComparison {
    pub better: GroupStats,
    pub worse: GroupStats,
    /// `None` when the test is undefined (tiny or constant groups).
    pub test: Option<WelchTTest>,
}

pub fn compare_groups(table: &WorkingTable) -> GroupComparison {
    let better_ages = table.ages(Some(InfraGroup::Better));
    let worse_ages = table.ages(Some(InfraGroup::Worse));

    let stats = |group, ages: &[f64]| GroupStats {
        group,
        deaths: ages.len(),
        mean_age: mean(ages).unwrap_or(f64::NAN),
    };

    GroupComparison {
        better: stats(InfraGroup::Better, &better_ages),
        worse: stats(InfraGroup::Worse, &worse_ages),
        test: welch_t_test(&better_ages, &worse_ages),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRow {
    pub chapter: char,
    pub deaths: usize,
    /// Share of the group's deaths, in percent.
    pub pct: f64,
}

/// Most frequent CID chapters within one group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterBreakdown {
    pub group: InfraGroup,
    pub total: usize,
    pub rows: Vec<ChapterRow>,
}

/// Top `top_n` chapters for `group`, by count (ties broken alphabetically).
pub fn chapter_breakdown(table: &WorkingTable, group: InfraGroup, top_n: usize) -> ChapterBreakdown {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for r in table.records.iter().filter(|r| r.group == group) {
        *counts.entry(r.record.cid_chapter).or_insert(0) += 1;
        total += 1;
    }

    let mut rows: Vec<ChapterRow> = counts
        .into_iter()
        .map(|(chapter, deaths)| ChapterRow {
            chapter,
            deaths,
            pct: percentage(deaths, total),
        })
        .collect();
    // Stable sort keeps alphabetical order among equal counts.
    rows.sort_by(|a, b| b.deaths.cmp(&a.deaths));
    rows.truncate(top_n);

    ChapterBreakdown { group, total, rows }
}

/// Mean age at death per UF of residence.
///
/// Records whose code does not start with a known IBGE state code are skipped.
pub fn mean_age_by_uf(table: &WorkingTable) -> BTreeMap<String, f64> {
    let mut acc: HashMap<&'static str, (f64, usize)> = HashMap::new();
    for r in &table.records {
        let Some(uf) = r.record.state_code().and_then(uf_for_state_code) else {
            continue;
        };
        let entry = acc.entry(uf).or_insert((0.0, 0));
        entry.0 += r.record.age_years as f64;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(uf, (sum, n))| (uf.to_string(), sum / n as f64))
        .collect()
}

/// Mean infrastructure index per UF across census areas.
pub fn mean_index_by_uf(areas: &[CensusArea]) -> BTreeMap<String, f64> {
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for a in areas {
        let entry = acc.entry(a.uf.clone()).or_insert((0.0, 0));
        entry.0 += a.infra_index;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(uf, (sum, n))| (uf, sum / n as f64))
        .collect()
}
