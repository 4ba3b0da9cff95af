// Workflow controller - sequences upload, configure, submit, await, display
//
// The controller owns:
// - The selected dataset (at most one)
// - The parameter form
// - The workflow state
// - The single in-flight request, tagged with a sequence number so late
//   responses for superseded requests are dropped

use crate::adapters::{adapt_components_result, adapt_variance_result};
use crate::client::{AnalysisRequest, AnalysisService};
use crate::error::{Result, StatlabError};
use crate::params::{FormFields, ParameterForm};
use crate::types::{
    AnalysisMethod, AnalysisOutput, AnalysisParams, AnalysisReport, ComponentsResult, ErrorInfo,
    VarianceResult,
};
use crate::upload::{self, SelectedDataset};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Current state of an analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "type", content = "data")]
pub enum WorkflowState {
    /// No dataset selected yet
    #[default]
    Idle,
    /// Dataset selected, nothing shown
    Configuring,
    /// A request is in flight
    Submitting,
    DisplayingVariance(VarianceResult),
    DisplayingComponents(ComponentsResult),
    Failed(ErrorInfo),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Configuring => "configuring",
            WorkflowState::Submitting => "submitting",
            WorkflowState::DisplayingVariance(_) => "displaying_variance",
            WorkflowState::DisplayingComponents(_) => "displaying_components",
            WorkflowState::Failed(_) => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, WorkflowState::Submitting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient user-facing message (toast)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    /// Notification for an error raised at the point of user action
    pub fn from_error(err: &StatlabError) -> Self {
        Self::error(err.to_string())
    }

    fn for_variance(result: &VarianceResult) -> Self {
        Self::info(
            "Analysis completed",
            format!(
                "Found {} significant variables",
                result.summary.benjamini_significant
            ),
        )
    }

    fn for_components(result: &ComponentsResult) -> Self {
        Self::info(
            "Analysis completed",
            format!(
                "PCA: {} components, {:.1}% variance",
                result.explained_variance.len(),
                result.summary.total_variance_explained
            ),
        )
    }
}

/// Identifies one submission. Handed back to [`WorkflowController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub method: AnalysisMethod,
    pub request_id: String,
}

/// A submission that has been accepted and must now be sent
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: AnalysisRequest,
}

/// What [`WorkflowController::complete`] did with a response
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied(Notification),
    /// The response belonged to a superseded request and was dropped
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    method: AnalysisMethod,
    params: AnalysisParams,
    dataset: String,
}

/// Inputs that produced the result currently on display
#[derive(Debug, Clone)]
struct Provenance {
    request_id: String,
    params: AnalysisParams,
    dataset: String,
}

/// Single analysis session
#[derive(Debug, Default)]
pub struct WorkflowController {
    form: ParameterForm,
    dataset: Option<SelectedDataset>,
    state: WorkflowState,
    last_seq: u64,
    in_flight: Option<InFlight>,
    displayed: Option<Provenance>,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: ParameterForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&SelectedDataset> {
        self.dataset.as_ref()
    }

    pub fn form(&self) -> &ParameterForm {
        &self.form
    }

    /// Edit form fields. The method is not reachable here; see
    /// [`WorkflowController::set_method`].
    ///
    /// ```compile_fail
    /// use statlab_rs::{AnalysisMethod, ParameterForm, WorkflowController};
    /// let mut controller = WorkflowController::new();
    /// *controller.form_mut() = ParameterForm::new().with_method(AnalysisMethod::Pca);
    /// ```
    pub fn form_mut(&mut self) -> FormFields<'_> {
        self.form.fields_mut()
    }

    /// Whether the run trigger should be enabled
    pub fn can_submit(&self) -> bool {
        self.dataset.is_some() && !self.state.is_submitting()
    }

    /// Run the upload gate and, on acceptance, replace the dataset and reset
    /// to `Configuring`. A rejected file leaves everything untouched.
    pub fn select_dataset(&mut self, file: SelectedDataset) -> Result<Notification> {
        upload::accept(&file)?;

        if let Some(superseded) = self.in_flight.take() {
            log::info!(
                "Dataset replaced; dropping in-flight request #{}",
                superseded.seq
            );
        }

        log::info!("Dataset selected: {} ({} bytes)", file.name(), file.len());
        let notification = Notification::info("File loaded:", file.name());
        self.dataset = Some(file);
        self.state = WorkflowState::Configuring;
        self.displayed = None;
        Ok(notification)
    }

    /// Switch the form's method. Supersedes an in-flight request for the
    /// other method.
    pub fn set_method(&mut self, method: AnalysisMethod) {
        if self.form.method() == method {
            return;
        }
        self.form.set_method(method);

        let superseded = match &self.in_flight {
            Some(in_flight) if in_flight.method != method => Some(in_flight.seq),
            _ => None,
        };
        if let Some(seq) = superseded {
            log::info!(
                "Method switched to {}; dropping in-flight request #{}",
                method,
                seq
            );
            self.in_flight = None;
            self.state = WorkflowState::Configuring;
        }
    }

    /// Validate the form and enter `Submitting`.
    ///
    /// Input-stage errors leave the state untouched.
    pub fn begin_submit(&mut self) -> Result<PendingRequest> {
        if self.state.is_submitting() {
            return Err(StatlabError::RequestInFlight);
        }
        let dataset = self.dataset.clone().ok_or(StatlabError::MissingDataset)?;
        let params = self.form.submit()?;
        let method = params.method();

        self.last_seq += 1;
        let ticket = Ticket {
            seq: self.last_seq,
            method,
            request_id: Uuid::new_v4().to_string(),
        };
        self.in_flight = Some(InFlight {
            seq: ticket.seq,
            method,
            params: params.clone(),
            dataset: dataset.name().to_string(),
        });
        self.state = WorkflowState::Submitting;
        self.displayed = None;

        log::info!(
            "Request #{} ({}) issued: {} analysis of {}",
            ticket.seq,
            ticket.request_id,
            method,
            dataset.name()
        );

        Ok(PendingRequest {
            ticket,
            request: AnalysisRequest::new(dataset, params),
        })
    }

    /// Apply the outcome of a request if it is still the live one.
    pub fn complete(&mut self, ticket: &Ticket, outcome: Result<Value>) -> Completion {
        let live = match self.in_flight.take() {
            Some(live) if live.seq == ticket.seq => live,
            other => {
                self.in_flight = other;
                log::debug!("Discarding stale response for request #{}", ticket.seq);
                return Completion::Discarded;
            }
        };

        let adapted = outcome.and_then(|raw| match live.method {
            AnalysisMethod::Anova => adapt_variance_result(&raw).map(|result| {
                let notification = Notification::for_variance(&result);
                (WorkflowState::DisplayingVariance(result), notification)
            }),
            AnalysisMethod::Pca => adapt_components_result(&raw).map(|result| {
                let notification = Notification::for_components(&result);
                (WorkflowState::DisplayingComponents(result), notification)
            }),
        });

        match adapted {
            Ok((state, notification)) => {
                log::info!("Request #{} completed: {}", ticket.seq, state.name());
                self.state = state;
                self.displayed = Some(Provenance {
                    request_id: ticket.request_id.clone(),
                    params: live.params,
                    dataset: live.dataset,
                });
                Completion::Applied(notification)
            }
            Err(err) => {
                log::warn!("Request #{} failed: {}", ticket.seq, err);
                let status = match &err {
                    StatlabError::Service { status, .. } => Some(*status),
                    _ => None,
                };
                let info = ErrorInfo {
                    method: live.method,
                    message: err.to_string(),
                    status,
                };
                let notification = Notification::error(info.message.clone());
                self.state = WorkflowState::Failed(info);
                Completion::Applied(notification)
            }
        }
    }

    /// Exportable record of the result on display, if any
    pub fn report(&self) -> Option<AnalysisReport> {
        let provenance = self.displayed.as_ref()?;
        let result = match &self.state {
            WorkflowState::DisplayingVariance(r) => AnalysisOutput::Anova(r.clone()),
            WorkflowState::DisplayingComponents(r) => AnalysisOutput::Pca(r.clone()),
            _ => return None,
        };
        Some(AnalysisReport {
            id: provenance.request_id.clone(),
            dataset: provenance.dataset.clone(),
            params: provenance.params.clone(),
            created_at: Utc::now(),
            result,
        })
    }

    /// Submit, await the service and apply the response in one go.
    pub async fn run_analysis<S>(&mut self, service: &S) -> Result<Completion>
    where
        S: AnalysisService + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = service.analyze(&pending.request).await;
        Ok(self.complete(&pending.ticket, outcome))
    }
}
