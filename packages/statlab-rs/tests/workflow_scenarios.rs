use async_trait::async_trait;
use serde_json::{json, Value};
use statlab_rs::{
    AnalysisMethod, AnalysisRequest, AnalysisService, Completion, HealthStatus, NotificationLevel,
    ScalingMethod, SelectedDataset, StatlabError, WorkflowController, WorkflowState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory service returning canned responses and recording requests
struct FakeService {
    response: Mutex<Option<statlab_rs::Result<Value>>>,
    calls: AtomicUsize,
    last_fields: Mutex<Vec<(&'static str, String)>>,
}

impl FakeService {
    fn replying(response: statlab_rs::Result<Value>) -> Self {
        Self {
            response: Mutex::new(Some(response)),
            calls: AtomicUsize::new(0),
            last_fields: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn analyze(&self, request: &AnalysisRequest) -> statlab_rs::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_fields.lock().unwrap() = request.form_fields();
        self.response
            .lock()
            .unwrap()
            .take()
            .expect("FakeService called more than once")
    }

    async fn health(&self) -> statlab_rs::Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            service: None,
        })
    }
}

fn dataset(name: &str) -> SelectedDataset {
    SelectedDataset::new(name, None, &b"Treatment,x,y\n1,0.1,0.2\n2,0.3,0.4\n"[..])
}

fn three_variable_anova() -> Value {
    let row = |name: &str, p: f64, sig: bool| {
        json!({"variable": name, "pValue": p, "fdr": p * 3.0, "bonferroni": p * 3.0, "benjamini": sig})
    };
    let groups = json!([
        {"group": "Group 1", "min": 1.0, "q1": 2.0, "median": 3.0, "q3": 4.0, "max": 5.0, "values": [1.0, 3.0, 5.0]},
        {"group": "Group 2", "min": 2.0, "q1": 2.5, "median": 3.5, "q3": 4.5, "max": 6.0, "values": [2.0, 3.5, 6.0]}
    ]);
    json!({
        "results": [row("Glucose", 0.001, true), row("Lactate", 0.2, false), row("Urea", 0.6, false)],
        "significant_variables": [0],
        "boxplot_data": [groups],
        "summary": {
            "total_variables": 3,
            "benjamini_significant": 1,
            "bonferroni_significant": 1,
            "nominal_significant": 1,
            "fdr_threshold": 0.05
        }
    })
}

fn three_component_pca() -> Value {
    json!({
        "scores": [
            {"sample": "Sample_1", "pc1": 1.2, "pc2": -0.4, "pc3": 0.1, "group": 1},
            {"sample": "Sample_2", "pc1": -0.8, "pc2": 0.9, "pc3": -0.2, "group": 2},
            {"sample": "Sample_3", "pc1": 0.1, "pc2": 0.3, "pc3": 0.0, "group": 1}
        ],
        "explainedVariance": [45.2, 20.1, 10.3],
        "cumulativeVariance": [45.2, 65.3, 75.6],
        "summary": {
            "n_components": 3,
            "scaling_method": "auto",
            "total_variance_explained": 75.6,
            "design_label": "Treatment"
        }
    })
}

#[tokio::test]
async fn scenario_a_anova_reports_significant_count() {
    let service = FakeService::replying(Ok(three_variable_anova()));
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.csv")).unwrap();
    controller.form_mut().anova.fdr_threshold = 0.05;
    *controller.form_mut().design_label = "Treatment".to_string();

    let completion = controller.run_analysis(&service).await.unwrap();

    let note = match completion {
        Completion::Applied(note) => note,
        Completion::Discarded => panic!("response should apply"),
    };
    assert_eq!(note.level, NotificationLevel::Info);
    assert!(note.description.contains('1'));
    assert_eq!(note.description, "Found 1 significant variables");

    match controller.state() {
        WorkflowState::DisplayingVariance(result) => {
            assert_eq!(result.results.len(), 3);
            assert_eq!(result.panels.len(), 1);
            assert_eq!(result.panels[0].variable, "Glucose");
        }
        other => panic!("unexpected state: {:?}", other),
    }

    let fields = service.last_fields.lock().unwrap().clone();
    assert!(fields.contains(&("fdr_threshold", "0.05".to_string())));
    assert!(fields.contains(&("design_label", "Treatment".to_string())));
    assert!(!fields.iter().any(|(k, _)| *k == "num_pcs"));
}

#[tokio::test]
async fn scenario_b_pca_builds_scree_series() {
    let service = FakeService::replying(Ok(three_component_pca()));
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.xlsx")).unwrap();
    controller.set_method(AnalysisMethod::Pca);
    controller.form_mut().pca.num_pcs = 3;
    controller.form_mut().pca.scaling = ScalingMethod::Auto;

    let completion = controller.run_analysis(&service).await.unwrap();
    match completion {
        Completion::Applied(note) => assert_eq!(note.description, "PCA: 3 components, 75.6% variance"),
        Completion::Discarded => panic!("response should apply"),
    }

    match controller.state() {
        WorkflowState::DisplayingComponents(result) => {
            let labels: Vec<&str> = result.scree.iter().map(|p| p.label.as_str()).collect();
            assert_eq!(labels, vec!["PC1", "PC2", "PC3"]);
            let cumulative: Vec<f64> = result.scree.iter().map(|p| p.cumulative).collect();
            assert_eq!(cumulative, vec![45.2, 65.3, 75.6]);
            assert_eq!(result.score_series.len(), 2);
        }
        other => panic!("unexpected state: {:?}", other),
    }

    let fields = service.last_fields.lock().unwrap().clone();
    assert!(fields.contains(&("num_pcs", "3".to_string())));
    assert!(fields.contains(&("scaling_method", "auto".to_string())));
    assert!(!fields.iter().any(|(k, _)| *k == "fdr_threshold"));
}

#[tokio::test]
async fn scenario_c_submit_without_dataset_issues_no_call() {
    let service = FakeService::replying(Ok(three_variable_anova()));
    let mut controller = WorkflowController::new();
    let before = controller.state().clone();

    let err = controller.run_analysis(&service).await.unwrap_err();

    assert!(matches!(err, StatlabError::MissingDataset));
    assert_eq!(controller.state(), &before);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn scenario_d_service_error_detail_becomes_failed_message() {
    let service = FakeService::replying(Err(StatlabError::Service {
        status: 500,
        message: "bad design label".to_string(),
    }));
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.csv")).unwrap();

    let completion = controller.run_analysis(&service).await.unwrap();
    assert!(matches!(completion, Completion::Applied(ref n) if n.level == NotificationLevel::Error));

    match controller.state() {
        WorkflowState::Failed(info) => {
            assert_eq!(info.message, "bad design label");
            assert_eq!(info.status, Some(500));
        }
        other => panic!("unexpected state: {:?}", other),
    }

    // Failure is recoverable: re-selecting resets to Configuring
    controller.select_dataset(dataset("data.csv")).unwrap();
    assert_eq!(controller.state(), &WorkflowState::Configuring);
}

#[test]
fn scenario_e_pdf_is_rejected_without_state_change() {
    let mut controller = WorkflowController::new();
    let pdf = SelectedDataset::new("paper.pdf", Some("application/pdf".to_string()), &b"%PDF"[..]);

    let err = controller.select_dataset(pdf).unwrap_err();

    assert!(matches!(err, StatlabError::FileType { .. }));
    assert_eq!(controller.state(), &WorkflowState::Idle);
    assert!(controller.dataset().is_none());

    controller.select_dataset(dataset("data.csv")).unwrap();
    let pdf = SelectedDataset::new("paper.pdf", None, &b"%PDF"[..]);
    assert!(controller.select_dataset(pdf).is_err());
    assert_eq!(controller.dataset().map(|d| d.name()), Some("data.csv"));
}

#[tokio::test]
async fn reselecting_same_file_is_idempotent() {
    let service = FakeService::replying(Ok(three_variable_anova()));
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.csv")).unwrap();
    controller.run_analysis(&service).await.unwrap();
    assert!(matches!(controller.state(), WorkflowState::DisplayingVariance(_)));

    controller.select_dataset(dataset("data.csv")).unwrap();
    let first = controller.state().clone();
    controller.select_dataset(dataset("data.csv")).unwrap();
    assert_eq!(controller.state(), &first);
    assert_eq!(first, WorkflowState::Configuring);
}

#[test]
fn late_response_after_dataset_change_is_discarded() {
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("first.csv")).unwrap();
    let stale = controller.begin_submit().unwrap();

    controller.select_dataset(dataset("second.csv")).unwrap();
    let fresh = controller.begin_submit().unwrap();

    assert_eq!(
        controller.complete(&stale.ticket, Ok(three_variable_anova())),
        Completion::Discarded
    );
    assert!(controller.state().is_submitting());

    assert!(matches!(
        controller.complete(&fresh.ticket, Ok(three_variable_anova())),
        Completion::Applied(_)
    ));
    assert!(matches!(controller.state(), WorkflowState::DisplayingVariance(_)));

    // A duplicate delivery of an already-applied response is also dropped
    assert_eq!(
        controller.complete(&fresh.ticket, Err(StatlabError::Transport("late".into()))),
        Completion::Discarded
    );
    assert!(matches!(controller.state(), WorkflowState::DisplayingVariance(_)));
}

#[test]
fn routing_uses_method_captured_at_submission() {
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.csv")).unwrap();
    controller.set_method(AnalysisMethod::Pca);
    let pending = controller.begin_submit().unwrap();
    assert_eq!(pending.ticket.method, AnalysisMethod::Pca);

    // Editing form fields of the same method does not disturb the request
    controller.form_mut().pca.num_pcs = 9;
    controller.complete(&pending.ticket, Ok(three_component_pca()));
    assert!(matches!(controller.state(), WorkflowState::DisplayingComponents(_)));
}

#[test]
fn malformed_success_is_treated_like_service_error() {
    let mut controller = WorkflowController::new();
    controller.select_dataset(dataset("data.csv")).unwrap();
    controller.set_method(AnalysisMethod::Pca);
    let pending = controller.begin_submit().unwrap();

    controller.complete(&pending.ticket, Ok(three_variable_anova()));

    match controller.state() {
        WorkflowState::Failed(info) => assert!(info.message.contains("scores")),
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(controller.can_submit());
}
