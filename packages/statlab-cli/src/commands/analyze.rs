use crate::cli::{AnovaArgs, PcaArgs, SubmitArgs};
use crate::exit_codes;
use crate::output;
use crate::render;
use statlab_rs::{
    AnalysisMethod, ClientConfig, Completion, ErrorStage, HttpAnalysisService, ParameterForm,
    SelectedDataset, StatlabError, WorkflowController, WorkflowState,
};

pub async fn execute_anova(args: AnovaArgs) -> i32 {
    let mut form = ParameterForm::new().with_method(AnalysisMethod::Anova);
    form.design_label = args.submit.design_label.clone();
    form.anova.fdr_threshold = args.fdr_threshold;
    form.anova.plot_option = args.plot_option;
    run(&args.submit, form).await
}

pub async fn execute_pca(args: PcaArgs) -> i32 {
    let mut form = ParameterForm::new().with_method(AnalysisMethod::Pca);
    form.design_label = args.submit.design_label.clone();
    form.pca.num_pcs = args.num_pcs;
    form.pca.scaling = args.scaling;
    run(&args.submit, form).await
}

fn exit_code_for(err: &StatlabError) -> i32 {
    match err.stage() {
        ErrorStage::Input => exit_codes::INPUT_ERROR,
        ErrorStage::Analysis => exit_codes::SERVICE_ERROR,
    }
}

async fn run(args: &SubmitArgs, form: ParameterForm) -> i32 {
    // Check parameters before touching the file or the network
    if let Err(e) = form.submit() {
        eprintln!("Error: {}", e);
        return exit_codes::INPUT_ERROR;
    }

    let dataset = match SelectedDataset::open(&args.file, args.media_type.clone()).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut controller = WorkflowController::with_form(form);
    match controller.select_dataset(dataset) {
        Ok(note) => {
            if !args.quiet {
                eprintln!("{}", render::notification(&note));
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
    }

    let service = match HttpAnalysisService::new(&ClientConfig::new(args.api_url.as_str())) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let method = controller.form().method();
    if !args.quiet {
        eprintln!(
            "Running {} on {} via {}...",
            method.display_name(),
            args.file,
            service.base_url()
        );
    }

    let completion = match controller.run_analysis(&service).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
    };

    if let Completion::Applied(note) = &completion {
        if let WorkflowState::Failed(info) = controller.state() {
            log::debug!("{} failed with status {:?}", info.method, info.status);
            eprintln!("Error: {}", note.description);
            return exit_codes::SERVICE_ERROR;
        }
        if !args.quiet {
            eprintln!("{}", render::notification(note));
        }
    }

    let Some(report) = controller.report() else {
        eprintln!("Error: no result to display");
        return exit_codes::EXECUTION_ERROR;
    };

    let rendered = if args.json || args.compact {
        match output::to_json(&report, args.compact) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else {
        match controller.state() {
            WorkflowState::DisplayingVariance(result) => render::variance(result),
            WorkflowState::DisplayingComponents(result) => render::components(result),
            _ => String::new(),
        }
    };

    if let Err(e) = output::print_stdout(&rendered) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if let Some(path) = &args.output {
        if let Err(e) = output::export(&report, path, args.compact) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
        if !args.quiet {
            eprintln!("Report written to {}", path);
        }
    }

    exit_codes::SUCCESS
}
