use crate::cli::HealthArgs;
use crate::exit_codes;
use crate::output;
use statlab_rs::{AnalysisService, ClientConfig, HttpAnalysisService};

pub async fn execute(args: HealthArgs) -> i32 {
    let service = match HttpAnalysisService::new(&ClientConfig::new(args.api_url.as_str())) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    match service.health().await {
        Ok(status) => {
            if args.json {
                match output::to_json(&status, false) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return exit_codes::EXECUTION_ERROR;
                    }
                }
            } else {
                match &status.service {
                    Some(name) => println!("{} at {}: {}", name, service.base_url(), status.status),
                    None => println!("{}: {}", service.base_url(), status.status),
                }
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::SERVICE_ERROR
        }
    }
}
