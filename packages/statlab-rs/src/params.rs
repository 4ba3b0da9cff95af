use crate::error::{Result, StatlabError};
use crate::types::{AnalysisMethod, AnalysisParams, AnovaParams, PcaParams, ScalingMethod};

pub const DEFAULT_DESIGN_LABEL: &str = "Treatment";
pub const DEFAULT_FDR_THRESHOLD: f64 = 0.05;
pub const DEFAULT_PLOT_OPTION: u8 = 3;
pub const MAX_PLOT_OPTION: u8 = 4;
pub const DEFAULT_NUM_PCS: i32 = 3;
pub const MIN_NUM_PCS: i32 = 2;
pub const MAX_NUM_PCS: i32 = 10;

/// Unvalidated ANOVA inputs as typed into the form
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaDraft {
    pub fdr_threshold: f64,
    pub plot_option: u8,
}

impl Default for AnovaDraft {
    fn default() -> Self {
        Self {
            fdr_threshold: DEFAULT_FDR_THRESHOLD,
            plot_option: DEFAULT_PLOT_OPTION,
        }
    }
}

/// Unvalidated PCA inputs as typed into the form
#[derive(Debug, Clone, PartialEq)]
pub struct PcaDraft {
    pub num_pcs: i32,
    pub scaling: ScalingMethod,
}

impl Default for PcaDraft {
    fn default() -> Self {
        Self {
            num_pcs: DEFAULT_NUM_PCS,
            scaling: ScalingMethod::Auto,
        }
    }
}

/// Analysis configuration form.
///
/// Both branch drafts live side by side so switching the method back and
/// forth keeps what the user typed. Only the active branch is validated and
/// emitted by [`ParameterForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterForm {
    method: AnalysisMethod,
    pub design_label: String,
    pub anova: AnovaDraft,
    pub pca: PcaDraft,
}

/// Mutable view of every form field except the method
#[derive(Debug)]
pub struct FormFields<'a> {
    pub design_label: &'a mut String,
    pub anova: &'a mut AnovaDraft,
    pub pca: &'a mut PcaDraft,
}

impl Default for ParameterForm {
    fn default() -> Self {
        Self {
            method: AnalysisMethod::Anova,
            design_label: DEFAULT_DESIGN_LABEL.to_string(),
            anova: AnovaDraft::default(),
            pca: PcaDraft::default(),
        }
    }
}

impl ParameterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: AnalysisMethod) -> Self {
        self.method = method;
        self
    }

    /// Method whose branch [`ParameterForm::submit`] validates.
    ///
    /// The field itself is not writable from outside the crate; a form owned
    /// by a controller only changes method through its `set_method`.
    ///
    /// ```compile_fail
    /// let mut form = statlab_rs::ParameterForm::new();
    /// form.method = statlab_rs::AnalysisMethod::Pca;
    /// ```
    pub fn method(&self) -> AnalysisMethod {
        self.method
    }

    pub(crate) fn set_method(&mut self, method: AnalysisMethod) {
        self.method = method;
    }

    pub fn fields_mut(&mut self) -> FormFields<'_> {
        FormFields {
            design_label: &mut self.design_label,
            anova: &mut self.anova,
            pca: &mut self.pca,
        }
    }

    /// Freeze the active branch into an immutable snapshot.
    pub fn submit(&self) -> Result<AnalysisParams> {
        let design_label = validate_design_label(&self.design_label)?;

        match self.method {
            AnalysisMethod::Anova => {
                let fdr = self.anova.fdr_threshold;
                if !fdr.is_finite() || !(0.0..=1.0).contains(&fdr) {
                    return Err(StatlabError::validation(
                        "fdr_threshold",
                        format!("{} is outside [0, 1]", fdr),
                    ));
                }
                if self.anova.plot_option > MAX_PLOT_OPTION {
                    return Err(StatlabError::validation(
                        "plot_option",
                        format!(
                            "{} is outside [0, {}]",
                            self.anova.plot_option, MAX_PLOT_OPTION
                        ),
                    ));
                }
                Ok(AnalysisParams::Anova(AnovaParams {
                    design_label,
                    fdr_threshold: fdr,
                    plot_option: self.anova.plot_option,
                }))
            }
            AnalysisMethod::Pca => {
                let n = self.pca.num_pcs;
                if !(MIN_NUM_PCS..=MAX_NUM_PCS).contains(&n) {
                    return Err(StatlabError::validation(
                        "num_pcs",
                        format!("{} is outside [{}, {}]", n, MIN_NUM_PCS, MAX_NUM_PCS),
                    ));
                }
                Ok(AnalysisParams::Pca(PcaParams {
                    design_label,
                    num_pcs: n as u8,
                    scaling: self.pca.scaling,
                }))
            }
        }
    }
}

fn validate_design_label(label: &str) -> Result<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(StatlabError::validation(
            "design_label",
            "must not be empty",
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: StatlabError) -> &'static str {
        match err {
            StatlabError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_emit_anova_snapshot() {
        let params = ParameterForm::new().submit().unwrap();
        assert_eq!(
            params,
            AnalysisParams::Anova(AnovaParams {
                design_label: "Treatment".to_string(),
                fdr_threshold: 0.05,
                plot_option: 3,
            })
        );
    }

    #[test]
    fn test_fdr_threshold_boundaries() {
        let mut form = ParameterForm::new();
        for ok in [0.0, 1.0, 0.5] {
            form.anova.fdr_threshold = ok;
            assert!(form.submit().is_ok(), "{} should be accepted", ok);
        }
        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            form.anova.fdr_threshold = bad;
            assert_eq!(field_of(form.submit().unwrap_err()), "fdr_threshold");
        }
    }

    #[test]
    fn test_num_pcs_boundaries() {
        let mut form = ParameterForm::new().with_method(AnalysisMethod::Pca);
        for ok in [2, 10] {
            form.pca.num_pcs = ok;
            assert!(form.submit().is_ok());
        }
        for bad in [1, 11, 0, -3] {
            form.pca.num_pcs = bad;
            assert_eq!(field_of(form.submit().unwrap_err()), "num_pcs");
        }
    }

    #[test]
    fn test_blank_design_label_rejected_for_both_methods() {
        let mut form = ParameterForm::new();
        form.design_label = "   ".to_string();
        assert_eq!(field_of(form.submit().unwrap_err()), "design_label");
        form.set_method(AnalysisMethod::Pca);
        assert_eq!(field_of(form.submit().unwrap_err()), "design_label");
    }

    #[test]
    fn test_design_label_is_trimmed() {
        let mut form = ParameterForm::new();
        form.design_label = "  Dose ".to_string();
        assert_eq!(form.submit().unwrap().design_label(), "Dose");
    }

    #[test]
    fn test_plot_option_range() {
        let mut form = ParameterForm::new();
        form.anova.plot_option = 4;
        assert!(form.submit().is_ok());
        form.anova.plot_option = 5;
        assert_eq!(field_of(form.submit().unwrap_err()), "plot_option");
    }

    #[test]
    fn test_inactive_branch_is_neither_validated_nor_cleared() {
        let mut form = ParameterForm::new().with_method(AnalysisMethod::Pca);
        form.pca.num_pcs = 7;
        form.pca.scaling = ScalingMethod::Pareto;
        form.anova.fdr_threshold = 5.0;

        // Invalid ANOVA draft does not block a PCA submission
        let params = form.submit().unwrap();
        assert_eq!(params.method(), AnalysisMethod::Pca);

        form.set_method(AnalysisMethod::Anova);
        assert!(form.submit().is_err());

        form.set_method(AnalysisMethod::Pca);
        assert_eq!(form.pca.num_pcs, 7);
        assert_eq!(form.pca.scaling, ScalingMethod::Pareto);
    }
}
