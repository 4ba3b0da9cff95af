//! Plain-text views of adapted results.

use statlab_rs::{BoxplotPanel, ComponentsResult, Notification, NotificationLevel, VarianceResult};
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

pub fn notification(note: &Notification) -> String {
    match note.level {
        NotificationLevel::Info => format!("{} {}", note.title, note.description),
        NotificationLevel::Error => format!("{}: {}", note.title, note.description),
    }
}

/// Significance table followed by the boxplot preview panels
pub fn variance(result: &VarianceResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analysis Results (ANOVA)\n");
    let _ = writeln!(
        out,
        "  {:<24} {:>12} {:>12} {:>12} {:>12}",
        "Variable", "P-Value", "FDR", "Bonferroni", "Significant"
    );
    let _ = writeln!(out, "  {}", "-".repeat(76));
    for row in &result.results {
        let _ = writeln!(
            out,
            "  {:<24} {:>12.3e} {:>12.3e} {:>12.3e} {:>12}",
            truncate(&row.variable, 24),
            row.p_value,
            row.fdr,
            row.bonferroni,
            if row.significant { "yes" } else { "no" }
        );
    }

    let summary = &result.summary;
    let _ = writeln!(
        out,
        "\n  Benjamini-Hochberg significant: {}",
        summary.benjamini_significant
    );
    if let Some(n) = summary.bonferroni_significant {
        let _ = writeln!(out, "  Bonferroni significant: {}", n);
    }
    if let Some(n) = summary.nominal_significant {
        let _ = writeln!(out, "  Nominal (p <= 0.05): {}", n);
    }

    for panel in &result.panels {
        out.push('\n');
        out.push_str(&boxplot_panel(panel));
    }
    out
}

fn boxplot_panel(panel: &BoxplotPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Boxplot: {}", panel.variable);

    let lo = panel
        .groups
        .iter()
        .map(|g| g.min)
        .fold(f64::INFINITY, f64::min);
    let hi = panel
        .groups
        .iter()
        .map(|g| g.max)
        .fold(f64::NEG_INFINITY, f64::max);

    for group in &panel.groups {
        let _ = writeln!(
            out,
            "  {:<12} |{}| min={:.3} q1={:.3} median={:.3} q3={:.3} max={:.3} n={}",
            truncate(&group.group, 12),
            box_bar(lo, hi, [group.min, group.q1, group.median, group.q3, group.max]),
            group.min,
            group.q1,
            group.median,
            group.q3,
            group.max,
            group.values.len()
        );
    }
    out
}

/// Draw a horizontal box: whiskers `-`, box `=`, median `|`.
fn box_bar(lo: f64, hi: f64, five: [f64; 5]) -> String {
    let span = hi - lo;
    let pos = |v: f64| -> usize {
        if !span.is_finite() || span <= 0.0 {
            return BAR_WIDTH / 2;
        }
        (((v - lo) / span) * (BAR_WIDTH - 1) as f64).round() as usize
    };
    let [min, q1, median, q3, max] = five.map(pos);

    (0..BAR_WIDTH)
        .map(|i| {
            if i == median {
                '|'
            } else if i >= q1 && i <= q3 {
                '='
            } else if i >= min && i <= max {
                '-'
            } else {
                ' '
            }
        })
        .collect()
}

/// Scores plot series and scree table
pub fn components(result: &ComponentsResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PCA Scores Plot");
    let _ = writeln!(
        out,
        "  x: {}  y: {}\n",
        result.axis_label(0),
        result.axis_label(1)
    );
    for series in &result.score_series {
        let _ = writeln!(
            out,
            "  {} ({}, {} samples)",
            series.name,
            series.color,
            series.points.len()
        );
        for point in &series.points {
            let _ = writeln!(
                out,
                "    {:<16} {:>10.3} {:>10.3}",
                truncate(&point.sample_id, 16),
                point.pc1,
                point.pc2
            );
        }
    }

    let _ = writeln!(out, "\nScree Plot\n");
    let _ = writeln!(
        out,
        "  {:<6} {:>10} {:>12}  {}",
        "PC", "Variance %", "Cumulative %", ""
    );
    let _ = writeln!(out, "  {}", "-".repeat(30 + BAR_WIDTH));
    for point in &result.scree {
        let filled = ((point.variance.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {:<6} {:>10.1} {:>12.1}  {}",
            point.label,
            point.variance,
            point.cumulative,
            "#".repeat(filled)
        );
    }
    let _ = writeln!(
        out,
        "\n  Total variance explained: {:.1}%",
        result.summary.total_variance_explained
    );
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_box_bar_marks_median() {
        let bar = box_bar(0.0, 4.0, [0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(bar.chars().count(), BAR_WIDTH);
        assert_eq!(bar.matches('|').count(), 1);
        assert!(bar.starts_with('-'));
        assert!(bar.contains('='));
    }

    #[test]
    fn test_box_bar_degenerate_range() {
        let bar = box_bar(1.0, 1.0, [1.0; 5]);
        assert_eq!(bar.chars().nth(BAR_WIDTH / 2), Some('|'));
    }

    #[test]
    fn test_variance_view_lists_rows_and_panels() {
        let result = statlab_rs::adapt_variance_result(&json!({
            "results": [
                {"variable": "Glucose", "pValue": 0.00012, "fdr": 0.0004, "bonferroni": 0.0004, "benjamini": true}
            ],
            "boxplot_data": [[
                {"group": "Group 1", "min": 0.0, "q1": 1.0, "median": 2.0, "q3": 3.0, "max": 4.0, "values": [0.0, 4.0]}
            ]],
            "summary": {"benjamini_significant": 1}
        }))
        .unwrap();
        let text = variance(&result);
        assert!(text.contains("Glucose"));
        assert!(text.contains("1.200e-4"));
        assert!(text.contains("Boxplot: Glucose"));
        assert!(text.contains("Benjamini-Hochberg significant: 1"));
    }

    #[test]
    fn test_components_view() {
        let result = statlab_rs::adapt_components_result(&json!({
            "scores": [{"sample": "Sample_1", "pc1": 1.0, "pc2": 2.0, "group": 1}],
            "explainedVariance": [45.2, 20.1, 10.3],
            "cumulativeVariance": [45.2, 65.3, 75.6]
        }))
        .unwrap();
        let text = components(&result);
        assert!(text.contains("PC1 (45.2%)"));
        assert!(text.contains("Group 1 (#8b5cf6, 1 samples)"));
        assert!(text.contains("PC3"));
        assert!(text.contains("Total variance explained: 75.6%"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 5), "abcd~");
    }
}
