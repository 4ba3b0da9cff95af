use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;
use serde::Serialize;
use statlab_rs::upload::{self, SelectedDataset};

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    readable: bool,
    accepted: bool,
    media_type: Option<String>,
    size_bytes: Option<usize>,
    error: Option<String>,
}

pub async fn execute(args: ValidateArgs) -> i32 {
    let (result, code) = match SelectedDataset::from_path(&args.file, args.media_type.clone()).await
    {
        Ok(dataset) => {
            let verdict = upload::accept(&dataset);
            let code = if verdict.is_ok() {
                exit_codes::SUCCESS
            } else {
                exit_codes::INPUT_ERROR
            };
            (
                ValidateOutput {
                    file: args.file.clone(),
                    readable: true,
                    accepted: verdict.is_ok(),
                    media_type: dataset.media_type().map(str::to_string),
                    size_bytes: Some(dataset.len()),
                    error: verdict.err().map(|e| e.to_string()),
                },
                code,
            )
        }
        Err(e) => (
            ValidateOutput {
                file: args.file.clone(),
                readable: false,
                accepted: false,
                media_type: None,
                size_bytes: None,
                error: Some(e.to_string()),
            },
            exit_codes::INPUT_ERROR,
        ),
    };

    if args.json {
        match output::to_json(&result, false) {
            Ok(json) => {
                if let Err(e) = output::print_stdout(&json) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else if let Some(err) = &result.error {
        eprintln!("Error: {}", err);
    } else {
        println!("Valid: {}", result.file);
        if let Some(media_type) = &result.media_type {
            println!("  Media type: {}", media_type);
        }
        if let Some(size) = result.size_bytes {
            println!("  Size: {} bytes", size);
        }
    }

    code
}
