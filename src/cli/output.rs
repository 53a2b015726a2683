//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, VerityArgs};
use crate::error::Result;
use crate::result::PredictionResult;
use crate::training::EvaluationReport;

/// One line of `predict` output.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionLine {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    #[serde(flatten)]
    pub result: PredictionResult,
}

/// Summary of a training run.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub artifact_path: String,
    pub documents: usize,
    pub dropped: usize,
    pub vocabulary_size: usize,
    pub duration_ms: u64,
    pub report: EvaluationReport,
}

/// Output a result in the requested format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output predictions, one per input.
pub fn output_predictions(lines: &[PredictionLine], args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json if lines.len() == 1 => output_json(&lines[0], args),
        OutputFormat::Json => output_json(&lines, args),
        OutputFormat::Human => {
            for line in lines {
                output_prediction_human(line, args);
            }
            Ok(())
        }
    }
}

fn output_prediction_human(line: &PredictionLine, args: &VerityArgs) {
    let result = &line.result;
    match &result.error {
        None => println!(
            "{} ({:.1}% confidence)",
            result.label,
            result.confidence * 100.0
        ),
        Some(error) => println!("ERROR: {error}"),
    }

    if args.verbosity() > 1 {
        println!("  text: {}", line.text);
    }
    if let Some(normalized) = &line.normalized {
        println!("  normalized: {normalized}");
    }
}

/// Output a training summary, including the evaluation report.
pub fn output_training(summary: &TrainingSummary, args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(summary, args),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("Model saved to {}", summary.artifact_path);
                println!(
                    "Trained on {} documents ({} dropped), {} features, {} ms",
                    summary.documents,
                    summary.dropped,
                    summary.vocabulary_size,
                    summary.duration_ms
                );
                println!();
            }
            print!("{}", summary.report);
            Ok(())
        }
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &VerityArgs) -> Result<()> {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    output_generic_human(&value, 0);
    Ok(())
}

fn output_generic_human(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{pad}{key}:");
                        output_generic_human(val, indent + 1);
                    }
                    _ => println!("{pad}{key}: {}", format_value(val)),
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() {
                    println!("{pad}[{}]", i + 1);
                    output_generic_human(item, indent + 1);
                } else {
                    println!("{pad}- {}", format_value(item));
                }
            }
        }
        _ => println!("{pad}{}", format_value(value)),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize + ?Sized>(result: &T, args: &VerityArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a scalar JSON value for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Label;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("text")), "text");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!([1, "a"])), "[1, a]");
        assert_eq!(format_value(&json!(null)), "-");
    }

    #[test]
    fn test_prediction_line_json() {
        let line = PredictionLine {
            text: "Senate votes".to_string(),
            normalized: None,
            result: PredictionResult::success(Label::True, 0.8),
        };

        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({"text": "Senate votes", "label": "TRUE", "confidence": 0.8, "is_fake": false})
        );
    }
}
