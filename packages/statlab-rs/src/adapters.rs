//! Pure transforms from raw service JSON into chart-ready results.
//!
//! Both adapters fail closed: a missing or mistyped required field yields
//! [`StatlabError::Adapter`] naming the field, never a partial result.

use crate::error::{Result, StatlabError};
use crate::types::{
    BoxplotPanel, BoxplotSummary, ComponentsResult, ComponentsSummary, PcaScoreRow, ScoreSeries,
    ScreePoint, VarianceResult, VarianceSummary, VarianceTableRow,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Number of boxplot panels shown next to the ANOVA table
pub const BOXPLOT_PREVIEW_LIMIT: usize = 4;

/// Scores plot group colours, cycled by series index
pub const PALETTE: [&str; 5] = ["#8b5cf6", "#3b82f6", "#10b981", "#f59e0b", "#ef4444"];

/// Colour for the `index`-th score series. Total over all indices.
pub fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn object<'a>(raw: &'a Value) -> Result<&'a serde_json::Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| StatlabError::adapter("<body>", "is not a JSON object"))
}

fn required<T: DeserializeOwned>(
    body: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<T> {
    let value = body
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| StatlabError::adapter(field, "is missing"))?;
    serde_json::from_value(value.clone())
        .map_err(|e| StatlabError::adapter(field, format!("has the wrong shape: {}", e)))
}

fn optional<T: DeserializeOwned>(
    body: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<Option<T>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required(body, field).map(Some),
    }
}

/// Adapt an ANOVA response.
///
/// Rows pass through unchanged. Boxplot sequences are paired with the table
/// row at the same index; only the first [`BOXPLOT_PREVIEW_LIMIT`] become
/// chart panels.
pub fn adapt_variance_result(raw: &Value) -> Result<VarianceResult> {
    let body = object(raw)?;

    let results: Vec<VarianceTableRow> = required(body, "results")?;
    let boxplot_data: Vec<Vec<BoxplotSummary>> = required(body, "boxplot_data")?;
    let significant_variables: Vec<usize> =
        optional(body, "significant_variables")?.unwrap_or_default();

    for (i, groups) in boxplot_data.iter().enumerate() {
        for (j, summary) in groups.iter().enumerate() {
            if !summary.is_ordered() {
                return Err(StatlabError::adapter(
                    format!("boxplot_data[{}][{}]", i, j),
                    format!(
                        "violates min <= q1 <= median <= q3 <= max ({}, {}, {}, {}, {})",
                        summary.min, summary.q1, summary.median, summary.q3, summary.max
                    ),
                ));
            }
        }
    }

    let summary = match optional::<VarianceSummary>(body, "summary")? {
        Some(summary) => summary,
        None => VarianceSummary {
            total_variables: Some(results.len()),
            benjamini_significant: results.iter().filter(|r| r.significant).count(),
            ..VarianceSummary::default()
        },
    };

    let panels = boxplot_data
        .iter()
        .take(BOXPLOT_PREVIEW_LIMIT)
        .enumerate()
        .map(|(idx, groups)| BoxplotPanel {
            variable: results
                .get(idx)
                .map(|r| r.variable.clone())
                .unwrap_or_else(|| format!("Variable {}", idx + 1)),
            groups: groups.clone(),
        })
        .collect();

    log::debug!(
        "Adapted ANOVA result: {} rows, {} boxplot sequences",
        results.len(),
        boxplot_data.len()
    );

    Ok(VarianceResult {
        results,
        boxplot_data,
        significant_variables,
        summary,
        panels,
    })
}

/// Adapt a PCA response into scree and scores series.
///
/// Cumulative variance is surfaced as sent, not recomputed.
pub fn adapt_components_result(raw: &Value) -> Result<ComponentsResult> {
    let body = object(raw)?;

    let scores: Vec<PcaScoreRow> = required(body, "scores")?;
    let explained_variance: Vec<f64> = required(body, "explainedVariance")?;
    let cumulative_variance: Vec<f64> = required(body, "cumulativeVariance")?;
    let loadings: Option<Vec<Vec<f64>>> = optional(body, "loadings")?;

    if cumulative_variance.len() != explained_variance.len() {
        return Err(StatlabError::adapter(
            "cumulativeVariance",
            format!(
                "has {} entries but explainedVariance has {}",
                cumulative_variance.len(),
                explained_variance.len()
            ),
        ));
    }

    let summary = match optional::<ComponentsSummary>(body, "summary")? {
        Some(summary) => summary,
        None => ComponentsSummary {
            n_components: Some(explained_variance.len()),
            total_variance_explained: cumulative_variance.last().copied().unwrap_or(0.0),
            ..ComponentsSummary::default()
        },
    };

    let scree = scree_series(&explained_variance, &cumulative_variance);
    let score_series = group_scores(&scores);

    log::debug!(
        "Adapted PCA result: {} samples in {} groups, {} components",
        scores.len(),
        score_series.len(),
        scree.len()
    );

    Ok(ComponentsResult {
        scores,
        explained_variance,
        cumulative_variance,
        loadings,
        summary,
        scree,
        score_series,
    })
}

fn scree_series(explained: &[f64], cumulative: &[f64]) -> Vec<ScreePoint> {
    explained
        .iter()
        .zip(cumulative)
        .enumerate()
        .map(|(i, (&variance, &cumulative))| ScreePoint {
            label: format!("PC{}", i + 1),
            variance,
            cumulative,
        })
        .collect()
}

/// Partition scores by group, keeping groups in order of first appearance.
fn group_scores(scores: &[PcaScoreRow]) -> Vec<ScoreSeries> {
    let mut series: Vec<ScoreSeries> = Vec::new();

    for row in scores {
        match series.iter_mut().find(|s| s.group == row.group_index) {
            Some(existing) => existing.points.push(row.clone()),
            None => {
                let index = series.len();
                series.push(ScoreSeries {
                    group: row.group_index,
                    name: format!("Group {}", row.group_index),
                    color: series_color(index).to_string(),
                    points: vec![row.clone()],
                });
            }
        }
    }

    series
}
