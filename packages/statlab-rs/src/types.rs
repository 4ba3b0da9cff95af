use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis method selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// One-way analysis of variance
    #[default]
    Anova,
    /// Principal component analysis
    Pca,
}

impl AnalysisMethod {
    /// Path segment of the service endpoint for this method
    pub fn endpoint(&self) -> &'static str {
        match self {
            AnalysisMethod::Anova => "anova",
            AnalysisMethod::Pca => "pca",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisMethod::Anova => "One-Way ANOVA",
            AnalysisMethod::Pca => "PCA Analysis",
        }
    }

    /// Error message used when the service fails without a `detail`
    pub fn fallback_error(&self) -> &'static str {
        match self {
            AnalysisMethod::Anova => "ANOVA analysis failed",
            AnalysisMethod::Pca => "PCA analysis failed",
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Pre-processing applied by the service before PCA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScalingMethod {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "mean")]
    MeanCenter,
    #[serde(rename = "pareto")]
    Pareto,
}

impl ScalingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingMethod::Auto => "auto",
            ScalingMethod::MeanCenter => "mean",
            ScalingMethod::Pareto => "pareto",
        }
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ScalingMethod::Auto),
            "mean" | "mean_center" | "mean-center" => Ok(ScalingMethod::MeanCenter),
            "pareto" => Ok(ScalingMethod::Pareto),
            other => Err(format!(
                "Unknown scaling method '{}'. Valid methods: auto, mean, pareto",
                other
            )),
        }
    }
}

/// Validated ANOVA parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaParams {
    pub design_label: String,
    pub fdr_threshold: f64,
    pub plot_option: u8,
}

/// Validated PCA parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaParams {
    pub design_label: String,
    pub num_pcs: u8,
    pub scaling: ScalingMethod,
}

/// Immutable snapshot of the active branch of the parameter form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AnalysisParams {
    Anova(AnovaParams),
    Pca(PcaParams),
}

impl AnalysisParams {
    pub fn method(&self) -> AnalysisMethod {
        match self {
            AnalysisParams::Anova(_) => AnalysisMethod::Anova,
            AnalysisParams::Pca(_) => AnalysisMethod::Pca,
        }
    }

    pub fn design_label(&self) -> &str {
        match self {
            AnalysisParams::Anova(p) => &p.design_label,
            AnalysisParams::Pca(p) => &p.design_label,
        }
    }
}

/// One row of the ANOVA significance table, as sent by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceTableRow {
    pub variable: String,
    #[serde(rename = "pValue")]
    pub p_value: f64,
    pub fdr: f64,
    pub bonferroni: f64,
    /// Benjamini-Hochberg significance at the requested threshold
    #[serde(rename = "benjamini")]
    pub significant: bool,
    #[serde(rename = "effectSize", default, skip_serializing_if = "Option::is_none")]
    pub effect_size: Option<f64>,
}

/// Five-number summary of one factor level, pre-aggregated by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotSummary {
    pub group: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl BoxplotSummary {
    pub fn is_ordered(&self) -> bool {
        self.min <= self.q1 && self.q1 <= self.median && self.median <= self.q3 && self.q3 <= self.max
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VarianceSummary {
    #[serde(default)]
    pub total_variables: Option<usize>,
    pub benjamini_significant: usize,
    #[serde(default)]
    pub bonferroni_significant: Option<usize>,
    #[serde(default)]
    pub nominal_significant: Option<usize>,
    #[serde(default)]
    pub fdr_threshold: Option<f64>,
}

/// Chart panel: one variable's boxplot groups, labelled from the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotPanel {
    pub variable: String,
    pub groups: Vec<BoxplotSummary>,
}

/// Adapted ANOVA response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    pub results: Vec<VarianceTableRow>,
    pub boxplot_data: Vec<Vec<BoxplotSummary>>,
    #[serde(default)]
    pub significant_variables: Vec<usize>,
    pub summary: VarianceSummary,
    /// First few boxplot sequences paired with their table rows
    pub panels: Vec<BoxplotPanel>,
}

/// One sample projected onto the leading components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaScoreRow {
    #[serde(rename = "sample")]
    pub sample_id: String,
    pub pc1: f64,
    pub pc2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc3: Option<f64>,
    #[serde(rename = "group")]
    pub group_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComponentsSummary {
    #[serde(default)]
    pub n_components: Option<usize>,
    #[serde(default)]
    pub scaling_method: Option<String>,
    pub total_variance_explained: f64,
    #[serde(default)]
    pub design_label: Option<String>,
}

/// Scree plot entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreePoint {
    pub label: String,
    pub variance: f64,
    pub cumulative: f64,
}

/// Scores plot series for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSeries {
    pub group: i64,
    pub name: String,
    pub color: String,
    pub points: Vec<PcaScoreRow>,
}

/// Adapted PCA response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsResult {
    pub scores: Vec<PcaScoreRow>,
    pub explained_variance: Vec<f64>,
    pub cumulative_variance: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadings: Option<Vec<Vec<f64>>>,
    pub summary: ComponentsSummary,
    pub scree: Vec<ScreePoint>,
    pub score_series: Vec<ScoreSeries>,
}

impl ComponentsResult {
    /// Axis label for component `index` (0-based), e.g. `PC1 (45.2%)`
    pub fn axis_label(&self, index: usize) -> String {
        match self.explained_variance.get(index) {
            Some(v) => format!("PC{} ({:.1}%)", index + 1, v),
            None => format!("PC{}", index + 1),
        }
    }
}

/// Failure shown in place of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub method: AnalysisMethod,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Adapted result of either method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AnalysisOutput {
    Anova(VarianceResult),
    Pca(ComponentsResult),
}

/// Exportable record of a displayed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub dataset: String,
    pub params: AnalysisParams,
    pub created_at: DateTime<Utc>,
    pub result: AnalysisOutput,
}
