use std::process::ExitCode;

use serde::Serialize;
use tautest_core::http::{HttpError, HttpValidationResult, RenderedResponse, ReportSink};
use tautest_core::Value;

/// Renders responses to stderr so stdout stays machine-readable.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn render_response(&self, response: &RenderedResponse) {
        eprintln!("{response}");
    }
}

#[derive(Serialize)]
struct CliError<'a> {
    status: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct CliReport<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a HttpValidationResult>,
}

pub(super) fn error_exit(message: &str, json: bool) -> ExitCode {
    if json {
        let payload = CliError {
            status: "error",
            message,
        };
        let output = serde_json::to_string_pretty(&payload).unwrap_or(message.to_string());
        eprintln!("{output}");
    } else {
        eprintln!("{message}");
    }
    ExitCode::from(2)
}

/// Prints the outcome of one request and maps it to an exit code.
///
/// Validation failures exit with 1; anything that kept the request from
/// being validated exits with 2.
pub(super) fn report_outcome(
    outcome: &Result<Value, HttpError>,
    result: Option<&HttpValidationResult>,
    json: bool,
) -> ExitCode {
    let error = match outcome {
        Ok(body) => {
            if json {
                print_json(&CliReport {
                    status: "passed",
                    message: None,
                    body: Some(body.to_json()),
                    result,
                });
            } else {
                print!("{}", format_result_human("PASSED", result));
            }
            return ExitCode::SUCCESS;
        }
        Err(error) => error,
    };

    if !is_validation_failure(error) {
        return error_exit(&error.to_string(), json);
    }
    if json {
        print_json(&CliReport {
            status: "failed",
            message: Some(error.to_string()),
            body: None,
            result,
        });
    } else {
        let mut output = format_result_human("FAILED", result);
        output.push_str(&error.to_string());
        output.push('\n');
        print!("{output}");
    }
    ExitCode::from(1)
}

fn is_validation_failure(error: &HttpError) -> bool {
    matches!(
        error,
        HttpError::Assertion { .. } | HttpError::Validation { .. } | HttpError::MalformedBody { .. }
    )
}

fn print_json(report: &CliReport<'_>) {
    let output = serde_json::to_string_pretty(report)
        .unwrap_or("<failed to serialize report>".to_string());
    println!("{output}");
}

fn format_result_human(verdict: &str, result: Option<&HttpValidationResult>) -> String {
    let Some(result) = result else {
        return format!("{verdict}\n");
    };
    let mut output = format!("{verdict} {} {}", result.method, result.full_url);
    if let Some(response) = &result.response {
        output.push_str(&format!(" -> {}", response.status_line()));
    }
    if let Some(elapsed_ms) = result.elapsed_ms {
        output.push_str(&format!(" ({elapsed_ms} ms)"));
    }
    if result.redirect_hops > 0 {
        output.push_str(&format!(", {} redirect(s)", result.redirect_hops));
    }
    output.push('\n');
    output
}
