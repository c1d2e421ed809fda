use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vrt_lib::{ErrorOutput, VrtError, VrtOutput, VRT_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &VrtOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: VrtError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = VrtOutput::Error(ErrorOutput {
        version: VRT_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    if let Err(write_err) = write_output(&payload, format, output) {
        eprintln!("Failed to write error output: {}", write_err);
    }

    // Exit code 2 is reserved for fatal errors; failed verdicts use 1.
    ExitCode::from(2)
}

/// Exit code for a finished run.
pub fn exit_code_for_run(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn write_json_output(body: &VrtOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &VrtOutput, output: Option<&Path>) -> io::Result<()> {
    let use_human = output.is_none() && io::stdout().is_terminal();

    if use_human {
        println!("{}", format_pretty(body, true));
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &VrtOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        VrtOutput::Run(out) => {
            let status = if out.passed { "PASS" } else { "FAIL" };
            let status = color(status, if out.passed { "32" } else { "31" }, colorize);
            writeln!(buf, "{status} Build {} ({} screenshots)", out.build_id, out.results.len()).ok();
            for outcome in &out.results {
                let mark = if outcome.passed {
                    color("ok", "32", colorize)
                } else {
                    color("failed", "31", colorize)
                };
                writeln!(buf, "- {:<8} {}", mark, outcome.name).ok();
                if let Some(result) = &outcome.result {
                    writeln!(buf, "    status:   {:?}", result.test_run_response.status).ok();
                    writeln!(buf, "    url:      {}", result.test_run_response.url).ok();
                    if let Some(diff) = &result.diff_url {
                        writeln!(buf, "    diff:     {diff}").ok();
                    }
                }
                if let Some(failure) = &outcome.failure {
                    writeln!(buf, "    {failure}").ok();
                }
            }
        }
        VrtOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrt_lib::{RunOutput, TrackOutcome, TransportError};

    #[test]
    fn pretty_run_lists_each_screenshot() {
        let body = VrtOutput::Run(RunOutput {
            version: VRT_OUTPUT_VERSION.to_string(),
            build_id: "b1".into(),
            project_id: "p1".into(),
            passed: false,
            results: vec![TrackOutcome {
                name: "home".into(),
                passed: false,
                result: None,
                failure: Some("No baseline: http://h/1".into()),
            }],
        });

        let text = format_pretty(&body, false);

        assert!(text.starts_with("FAIL Build b1 (1 screenshots)"), "{text}");
        assert!(text.contains("home"));
        assert!(text.contains("No baseline: http://h/1"));
    }

    #[test]
    fn pretty_error_includes_hint() {
        let payload = VrtError::from(TransportError::NoResponse).to_payload();
        let body = VrtOutput::Error(ErrorOutput {
            version: VRT_OUTPUT_VERSION.to_string(),
            message: None,
            error: payload,
        });

        let text = format_pretty(&body, false);

        assert!(text.starts_with("[ERROR] No response from server"), "{text}");
        assert!(text.contains("Hint: "));
    }
}
