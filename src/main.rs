use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use calcert_docx::{CertificateParseResult, Error, SensorType};

#[derive(Parser)]
#[command(
    name = "calcert",
    version,
    about = "Extract sensor calibration metrics from calibration certificate DOCX files"
)]
struct Cli {
    /// Certificate files (.docx)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print the raw merge-field / content-control values instead of the parsed result
    #[arg(long)]
    fields: bool,

    /// Print JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// File name to use for date recovery (single input only)
    #[arg(long)]
    filename: Option<String>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_one(path: &Path, filename: Option<&str>) -> Result<CertificateParseResult, Error> {
    match filename {
        Some(name) => {
            let bytes = std::fs::read(path)?;
            calcert_docx::parse_calibration_certificate_bytes(&bytes, Some(name))
        }
        None => calcert_docx::parse_calibration_certificate(path),
    }
}

fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_summary(path: &Path, res: &CertificateParseResult) {
    println!("{}", path.display());
    println!("  date:          {}", opt(res.date_iso.as_deref()));
    println!("  reference id:  {}", opt(res.calibration_reference_id.as_deref()));
    println!("  system SN:     {}", opt(res.system_sn.as_deref()));
    if !res.sensor_types_calibrated.is_empty() {
        println!("  declared:      {}", res.sensor_types_calibrated.join(", "));
    }
    for sensor in SensorType::ALL {
        let metrics: Vec<String> = sensor
            .metrics()
            .iter()
            .map(|m| format!("{m}={}", opt(res.metric(sensor, *m))))
            .collect();
        println!(
            "  {:<6} model={} sn={} {}",
            sensor.to_string(),
            opt(res.model(sensor)),
            opt(res.serial(sensor)),
            metrics.join(" "),
        );
    }
}

fn run(cli: &Cli, path: &Path) -> Result<(), Error> {
    if cli.fields {
        let fields = calcert_docx::extract_merge_fields(path)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&fields).unwrap_or_default());
        } else {
            println!("{}", path.display());
            for (name, value) in &fields {
                println!("  {name} = {value:?}");
            }
        }
        return Ok(());
    }

    let res = parse_one(path, cli.filename.as_deref())?;
    if cli.json {
        let out = serde_json::json!({
            "file": path.display().to_string(),
            "result": &res,
            "metrics": res.metrics_by_type(),
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        print_summary(path, &res);
    }

    if !res.has_metrics() {
        let fields = calcert_docx::extract_merge_fields(path)?;
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        log::warn!(
            "{}: no calibration metric found; detected fields: [{}]",
            path.display(),
            names.join(", ")
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.filename.is_some() && cli.inputs.len() > 1 {
        eprintln!("Error: --filename can only be used with a single input");
        return ExitCode::from(2);
    }

    let mut failed = 0usize;
    for path in &cli.inputs {
        if let Err(e) = run(&cli, path) {
            eprintln!("Error: {}: {e}", path.display());
            failed += 1;
        }
    }
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
