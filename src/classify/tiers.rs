//! Median split of census areas by infrastructure index.

use std::collections::HashSet;

use crate::classify::normalize_text;
use crate::domain::{CensusArea, InfraGroup};
use crate::math::median;

/// Normalized city names above/below the median infrastructure index.
#[derive(Debug, Clone)]
pub struct InfraTiers {
    pub median: f64,
    better: HashSet<String>,
    worse: HashSet<String>,
}

impl InfraTiers {
    /// Split areas at the median index: `>= median` is better, `< median` is worse.
    ///
    /// Returns `None` when there are no areas.
    pub fn from_areas(areas: &[CensusArea]) -> Option<Self> {
        let indices: Vec<f64> = areas.iter().map(|a| a.infra_index).collect();
        let median = median(&indices)?;

        let mut better = HashSet::new();
        let mut worse = HashSet::new();
        for area in areas {
            let name = normalize_text(&area.city);
            if area.infra_index >= median {
                better.insert(name);
            } else {
                worse.insert(name);
            }
        }

        Some(Self { median, better, worse })
    }

    /// Group for a normalized municipality name.
    ///
    /// A name listed in both tiers (homonymous cities in different states)
    /// resolves to `Worse`.
    pub fn classify(&self, normalized_name: &str) -> InfraGroup {
        if self.worse.contains(normalized_name) {
            InfraGroup::Worse
        } else if self.better.contains(normalized_name) {
            InfraGroup::Better
        } else {
            InfraGroup::Unclassified
        }
    }

    pub fn better_len(&self) -> usize {
        self.better.len()
    }

    pub fn worse_len(&self) -> usize {
        self.worse.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(city: &str, uf: &str, index: f64) -> CensusArea {
        CensusArea {
            label: format!("{city}/{uf}"),
            city: city.to_string(),
            uf: uf.to_string(),
            pct_paved: index,
            pct_lighting: index,
            pct_sidewalk: index,
            infra_index: index,
        }
    }

    #[test]
    fn median_split_puts_ties_in_better() {
        let areas = vec![
            area("São Paulo", "SP", 0.9),
            area("Belém", "PA", 0.5),
            area("Macapá", "AP", 0.2),
        ];
        let tiers = InfraTiers::from_areas(&areas).unwrap();
        assert!((tiers.median - 0.5).abs() < 1e-12);
        assert_eq!(tiers.classify("SAO PAULO"), InfraGroup::Better);
        assert_eq!(tiers.classify("BELEM"), InfraGroup::Better);
        assert_eq!(tiers.classify("MACAPA"), InfraGroup::Worse);
        assert_eq!(tiers.classify("RECIFE"), InfraGroup::Unclassified);
        assert_eq!(tiers.better_len(), 2);
        assert_eq!(tiers.worse_len(), 1);
    }

    #[test]
    fn name_in_both_tiers_is_worse() {
        let areas = vec![
            area("Valença", "RJ", 0.8),
            area("Valença", "BA", 0.1),
            area("Niterói", "RJ", 0.9),
            area("Ilhéus", "BA", 0.2),
        ];
        let tiers = InfraTiers::from_areas(&areas).unwrap();
        assert_eq!(tiers.classify("VALENCA"), InfraGroup::Worse);
        assert_eq!(tiers.classify("NITEROI"), InfraGroup::Better);
    }

    #[test]
    fn empty_census_has_no_tiers() {
        assert!(InfraTiers::from_areas(&[]).is_none());
    }
}
