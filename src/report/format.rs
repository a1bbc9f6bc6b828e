//! Terminal formatting for the report tables.
//!
//! Column widths and rule lengths are part of the output format; the tests
//! below pin them.

use crate::classify::{InfraTiers, WorkingTable};
use crate::domain::InfraGroup;
use crate::io::{CensusIngest, MortalityIngest};
use crate::math::Describe;
use crate::report::{ChapterBreakdown, GroupComparison, GroupStats};

/// p-values at or below this print as `< 0.001`.
const P_VALUE_FLOOR: f64 = 0.001;

/// Row counts and join diagnostics for the run.
pub fn format_run_summary(
    mortality: &MortalityIngest,
    census: &CensusIngest,
    tiers: &InfraTiers,
    table: &WorkingTable,
) -> String {
    let mut out = String::new();

    out.push_str("=== mortinfra - Mortalidade x Infraestrutura Urbana ===\n");
    out.push_str(&format!(
        "Óbitos: lidos={} | mantidos={} | descartados={} (idade={}, causa={}, sexo={}, município={}, malformados={})\n",
        format_thousands(mortality.rows_read),
        format_thousands(mortality.kept()),
        format_thousands(mortality.dropped.total()),
        format_thousands(mortality.dropped.no_age),
        format_thousands(mortality.dropped.no_cause),
        format_thousands(mortality.dropped.no_sex),
        format_thousands(mortality.dropped.no_municipality),
        format_thousands(mortality.dropped.malformed),
    ));
    out.push_str(&format!(
        "Censo: concentrações={} | sem UF={} | mediana do índice={:.4}\n",
        census.areas.len(),
        census.rows_without_uf,
        tiers.median,
    ));
    out.push_str(&format!(
        "Cidades: melhor infra={} | pior infra={}\n",
        tiers.better_len(),
        tiers.worse_len(),
    ));
    if table.names_resolved {
        out.push_str(&format!(
            "Junção por código: sem correspondência={}\n",
            format_thousands(table.unmatched)
        ));
    } else {
        out.push_str("Junção por código: nomes indisponíveis (N/A)\n");
    }

    let sizes = table.group_sizes();
    let parts: Vec<String> = [InfraGroup::Better, InfraGroup::Worse, InfraGroup::Unclassified]
        .iter()
        .map(|g| format!("{}={}", g.label(), format_thousands(sizes.get(g).copied().unwrap_or(0))))
        .collect();
    out.push_str(&format!("Grupos: {}\n", parts.join(" | ")));

    out
}

/// Table 1: descriptive statistics of age at death.
pub fn format_age_table(describe: Option<&Describe>) -> String {
    let rule = "-".repeat(50);
    let mut out = String::new();

    out.push_str("--- TABELA 1: ESTATÍSTICAS DESCRITIVAS DA IDADE NO ÓBITO ---\n");
    out.push_str(&rule);
    out.push('\n');
    match describe {
        Some(d) => {
            for (key, value) in d.entries() {
                out.push_str(&format!("{key:<10} | {value:>15.2}\n"));
            }
        }
        None => out.push_str("(sem registros)\n"),
    }
    out.push_str(&rule);
    out.push('\n');

    out
}

/// Table 2: CID chapter distribution per infrastructure group.
pub fn format_chapter_tables(breakdowns: &[ChapterBreakdown]) -> String {
    let rule = "-".repeat(50);
    let mut out = String::new();

    out.push_str("--- TABELA 2: CAPÍTULOS CID MAIS FREQUENTES POR GRUPO ---\n");
    for b in breakdowns {
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!(
            "{} (n = {})\n",
            b.group.display_name(),
            format_thousands(b.total)
        ));
        out.push_str(&format!("{:<10} | {:>15} | {:>15}\n", "Capítulo", "Nº de Óbitos", "% do Grupo"));
        if b.rows.is_empty() {
            out.push_str("(sem registros)\n");
        }
        for row in &b.rows {
            out.push_str(&format!(
                "{:<10} | {:>15} | {:>14.2}%\n",
                row.chapter,
                format_thousands(row.deaths),
                row.pct
            ));
        }
    }
    out.push_str(&rule);
    out.push('\n');

    out
}

/// Table 3: Welch's t-test of mean age at death, better vs worse infrastructure.
pub fn format_ttest_table(cmp: &GroupComparison) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();

    out.push_str("--- TABELA 3: RESULTADOS DO TESTE T - IDADE MÉDIA GERAL VS. INFRAESTRUTURA ---\n");
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{:<20} | {:>15} | {:>20} |\n",
        "Grupo", "Nº de Óbitos", "Idade Média (anos)"
    ));
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&group_row(&cmp.better));
    out.push_str(&group_row(&cmp.worse));
    out.push_str(&rule);
    out.push('\n');
    match &cmp.test {
        Some(test) => out.push_str(&format!(
            "Estatística t = {:.4} | Valor-p = {}\n",
            test.t,
            format_p_value(test.p_value)
        )),
        None => out.push_str("Estatística t = n/a | Valor-p = n/a\n"),
    }
    out.push_str(&rule);
    out.push('\n');

    out
}

fn group_row(stats: &GroupStats) -> String {
    // Empty groups have no mean.
    let mean = if stats.mean_age.is_finite() {
        format!("{:.2}", stats.mean_age)
    } else {
        "n/a".to_string()
    };
    format!(
        "{:<20} | {:>15} | {:>20} |\n",
        stats.group.display_name(),
        format_thousands(stats.deaths),
        mean
    )
}

/// Raw p-value, or `< 0.001` when it is at or below the floor.
pub fn format_p_value(p: f64) -> String {
    if p > P_VALUE_FLOOR {
        format!("{p}")
    } else if p.is_nan() {
        "n/a".to_string()
    } else {
        format!("< {P_VALUE_FLOOR}")
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{WelchTTest, describe};
    use crate::report::ChapterRow;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn p_value_formatting() {
        assert_eq!(format_p_value(0.25), "0.25");
        assert_eq!(format_p_value(0.001), "< 0.001");
        assert_eq!(format_p_value(1e-30), "< 0.001");
        assert_eq!(format_p_value(f64::NAN), "n/a");
    }

    #[test]
    fn age_table_layout() {
        let d = describe(&[60.0, 70.0, 80.0]).unwrap();
        let table = format_age_table(Some(&d));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "-".repeat(50));
        assert_eq!(lines[2], "count      |            3.00");
        assert_eq!(lines[3], "mean       |           70.00");
        assert_eq!(lines[7], "50%        |           70.00");
    }

    #[test]
    fn ttest_table_rows() {
        let cmp = GroupComparison {
            better: GroupStats {
                group: InfraGroup::Better,
                deaths: 12_345,
                mean_age: 71.456,
            },
            worse: GroupStats {
                group: InfraGroup::Worse,
                deaths: 987,
                mean_age: 65.0,
            },
            test: Some(WelchTTest {
                t: 12.345678,
                df: 1000.0,
                p_value: 1e-12,
            }),
        };
        let table = format_ttest_table(&cmp);
        assert!(table.contains("Melhor Infraestrutura |          12,345 |                71.46 |"));
        assert!(table.contains("Pior Infraestrutura  |             987 |                65.00 |"));
        assert!(table.contains("Estatística t = 12.3457 | Valor-p = < 0.001"));
    }

    #[test]
    fn empty_group_prints_na_mean() {
        let cmp = GroupComparison {
            better: GroupStats {
                group: InfraGroup::Better,
                deaths: 0,
                mean_age: f64::NAN,
            },
            worse: GroupStats {
                group: InfraGroup::Worse,
                deaths: 2,
                mean_age: 60.5,
            },
            test: None,
        };
        let table = format_ttest_table(&cmp);
        assert!(table.contains("Melhor Infraestrutura |               0 |                  n/a |"));
        assert!(table.contains("Pior Infraestrutura  |               2 |                60.50 |"));
        assert!(!table.contains("NaN"));
        assert!(table.contains("Estatística t = n/a | Valor-p = n/a"));
    }

    #[test]
    fn chapter_table_lists_rows() {
        let breakdowns = vec![ChapterBreakdown {
            group: InfraGroup::Worse,
            total: 4,
            rows: vec![ChapterRow {
                chapter: 'I',
                deaths: 3,
                pct: 75.0,
            }],
        }];
        let table = format_chapter_tables(&breakdowns);
        assert!(table.contains("Pior Infraestrutura (n = 4)"));
        assert!(table.contains("I          |               3 |          75.00%"));
    }
}
