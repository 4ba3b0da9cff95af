pub mod adapters;
pub mod client;
pub mod controller;
pub mod error;
pub mod params;
pub mod types;
pub mod upload;

pub use adapters::{adapt_components_result, adapt_variance_result, series_color, PALETTE};
pub use client::{AnalysisRequest, AnalysisService, ClientConfig, HealthStatus, HttpAnalysisService};
pub use controller::{
    Completion, Notification, NotificationLevel, PendingRequest, Ticket, WorkflowController,
    WorkflowState,
};
pub use error::{ErrorStage, Result, StatlabError};
pub use params::{FormFields, ParameterForm};
pub use types::*;
pub use upload::SelectedDataset;
