//! Schema Bridge CLI
//!
//! Command-line interface for querying form field metadata from a JSON Schema
//! and validating payloads against it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use form_schema_bridge::{
    lint, load_schema, load_schema_auto, load_schema_str, BridgeOptions, InitialValueOptions,
    PropsOverrides, SchemaBridge, Severity, ValidateError, Validator,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-bridge")]
#[command(about = "Query form field metadata from a JSON Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved schema of a field
    Field {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Dotted field path (empty for the root)
        #[arg(default_value = "")]
        path: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the immediate sub-fields of a field
    Fields {
        /// Schema source: file path or URL
        schema: String,

        /// Dotted field path (root if omitted)
        #[arg(default_value = "")]
        path: String,
    },

    /// Print the logical type of a field
    Type {
        /// Schema source: file path or URL
        schema: String,

        /// Dotted field path
        path: String,
    },

    /// Print the initial value of a field
    Initial {
        /// Schema source: file path or URL
        schema: String,

        /// Dotted field path
        path: String,

        /// Number of placeholder elements for array fields
        #[arg(long, default_value_t = 0)]
        count: usize,
    },

    /// Print the UI descriptor of a field
    Props {
        /// Schema source: file path or URL
        schema: String,

        /// Dotted field path
        path: String,

        /// Caller overrides as a JSON object (e.g. '{"label": true}')
        #[arg(long)]
        props: Option<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a payload against the schema
    Validate {
        /// Schema source: file path or URL
        schema: String,

        /// Payload file to validate
        payload: PathBuf,

        /// Report every failure instead of only the first
        #[arg(long)]
        all_errors: bool,

        /// Fill in schema defaults before validating
        #[arg(long)]
        use_defaults: bool,

        /// Drop properties rejected by additionalProperties: false
        #[arg(long)]
        remove_additional: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint a schema for unresolvable fields and unrenderable declarations
    Lint {
        /// Schema source: file path or URL
        schema: String,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Field {
            schema,
            path,
            pretty,
        } => run_field(&schema, &path, pretty),
        Commands::Fields { schema, path } => run_fields(&schema, &path),
        Commands::Type { schema, path } => run_type(&schema, &path),
        Commands::Initial {
            schema,
            path,
            count,
        } => run_initial(&schema, &path, count),
        Commands::Props {
            schema,
            path,
            props,
            pretty,
        } => run_props(&schema, &path, props.as_deref(), pretty),
        Commands::Validate {
            schema,
            payload,
            all_errors,
            use_defaults,
            remove_additional,
            json,
        } => {
            let options = BridgeOptions::new()
                .all_errors(all_errors)
                .use_defaults(use_defaults)
                .remove_additional(remove_additional);
            run_validate(&schema, &payload, options, json)
        }
        Commands::Lint {
            schema,
            format,
            strict,
        } => run_lint(&schema, &format, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn open_bridge(schema_source: &str, options: BridgeOptions) -> Result<SchemaBridge, u8> {
    let schema = load_schema_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    SchemaBridge::new(schema, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), u8> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", output);
    Ok(())
}

fn run_field(schema_source: &str, path: &str, pretty: bool) -> Result<(), u8> {
    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let field = bridge.get_field(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    print_json(&field, pretty)
}

fn run_fields(schema_source: &str, path: &str) -> Result<(), u8> {
    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let fields = bridge.get_sub_fields(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    for field in fields {
        println!("{}", field);
    }
    Ok(())
}

fn run_type(schema_source: &str, path: &str) -> Result<(), u8> {
    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let logical = bridge.get_type(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    println!("{}", logical);
    Ok(())
}

fn run_initial(schema_source: &str, path: &str, count: usize) -> Result<(), u8> {
    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let value = bridge
        .get_initial_value(path, InitialValueOptions::with_count(count))
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
    // No initial value prints nothing.
    match value {
        Some(value) => print_json(&value, false),
        None => Ok(()),
    }
}

fn run_props(
    schema_source: &str,
    path: &str,
    props: Option<&str>,
    pretty: bool,
) -> Result<(), u8> {
    let overrides = match props {
        Some(text) => {
            let value = load_schema_str(text).map_err(|e| {
                eprintln!("Error parsing --props: {}", e);
                2u8
            })?;
            PropsOverrides::from_value(value).ok_or_else(|| {
                eprintln!("Error: --props must be a JSON object");
                2u8
            })?
        }
        None => PropsOverrides::new(),
    };

    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let field_props = bridge.get_props(path, &overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    print_json(&field_props, pretty)
}

fn run_validate(
    schema_source: &str,
    payload_path: &Path,
    options: BridgeOptions,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_schema(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;
    let bridge = open_bridge(schema_source, options)?;

    let outcome = Validator::new(&bridge).and_then(|validator| validator.validate(&payload));
    match outcome {
        Ok(amended) => {
            if json_output {
                let output = serde_json::json!({ "valid": true, "payload": amended });
                println!("{}", output);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { details }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": details
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for detail in details {
                    eprintln!("  {}", detail);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(schema_source: &str, format: &str, strict: bool) -> Result<(), u8> {
    let bridge = open_bridge(schema_source, BridgeOptions::default())?;
    let report = lint(&bridge);
    let passed = report.is_ok() && (!strict || report.warnings == 0);

    if format == "json" {
        print_json(&report, true)?;
    } else {
        println!("Linting {} ...\n", schema_source);
        for diag in &report.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            let path = if diag.path.is_empty() { "<root>" } else { &diag.path };
            println!(
                "  {}{}[{}]\x1b[0m: {} - {}",
                color, label, diag.code, path, diag.message
            );
        }

        println!();
        if passed {
            println!(
                "\x1b[32m✓ {} fields checked, all passed\x1b[0m",
                report.fields_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} fields checked ({} errors, {} warnings)\x1b[0m",
                report.fields_checked, report.errors, report.warnings
            );
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}
