use std::env;
use std::fs;
use std::time::Instant;

use pack_dp::{
    Capacity, Destination, DpSolver, ExhaustiveSolver, Item, PackingConfig, PackingInstance,
    PackingSolver,
};
use serde::Serialize;
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("pack_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    #[cfg(feature = "tracing")]
    enable_tracing();

    if let Some(path) = &options.input {
        if let Err(err) = solve_file(path, &options) {
            eprintln!("pack_probe: {err}");
            std::process::exit(1);
        }
        return;
    }

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("pack-dp probe: exact packing DP on generated instances");
    eprintln!("{}", "=".repeat(80));
    eprintln!("  • Correctness: net value matches exhaustive search (up to {} items)", options.verify_limit);
    eprintln!("  • Performance: wall-clock time, peak state count and memory per size");
    eprintln!();

    let mut sys = System::new();
    let solver = match DpSolver::with_config(options.config) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("pack_probe: {err}");
            std::process::exit(2);
        }
    };
    let measurements = run_sizes(&solver, &options, &mut sys);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("pack_probe output error: {err}");
        std::process::exit(1);
    }
}

#[cfg(feature = "tracing")]
fn enable_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
    input: Option<String>,
    config: PackingConfig,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 10usize;
        let mut input = None;
        let mut config = PackingConfig::default();

        while let Some(arg) = args.next() {
            let arg = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) => (f.to_string(), Some(v.to_string())),
                None => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String, String> {
                match &inline {
                    Some(v) => Ok(v.clone()),
                    None => args
                        .next()
                        .map(Into::into)
                        .ok_or_else(|| format!("missing value after {name}")),
                }
            };
            match flag.as_str() {
                "--help" | "-h" => {
                    Options::print_help();
                    std::process::exit(0);
                }
                "--format" => format = OutputFormat::from_str(&value("--format")?)?,
                "--verify-limit" => {
                    verify_limit = value("--verify-limit")?
                        .parse::<usize>()
                        .map_err(|_| "verify limit must be a non-negative integer".to_string())?;
                }
                "--input" => input = Some(value("--input")?),
                "--scale" => {
                    config.scale = value("--scale")?
                        .parse::<u32>()
                        .map_err(|_| "scale must be a positive integer".to_string())?;
                }
                "--max-states" => {
                    config.max_states = Some(
                        value("--max-states")?
                            .parse::<usize>()
                            .map_err(|_| "state limit must be a positive integer".to_string())?,
                    );
                }
                "--shards" => {
                    config.shards = value("--shards")?
                        .parse::<usize>()
                        .map_err(|_| "shard count must be a positive integer".to_string())?;
                }
                _ => return Err(format!("unrecognized argument '{arg}'")),
            }
        }

        Ok(Self {
            format,
            verify_limit,
            input,
            config,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin pack_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format for generated runs (default: csv)
  --verify-limit <N>            Largest item count cross-checked by exhaustive search (default: 10)
  --input <FILE>                Solve a JSON packing instance and print the plan as JSON
  --scale <N>                   Units per kg / litre (default: 2)
  --max-states <N>              Abort when a state table grows beyond N entries
  --shards <N>                  Expand large tables in N shards (needs feature `parallel`)
  -h, --help                    Print this help message

Examples:
  cargo run --bin pack_probe
  cargo run --bin pack_probe -- --format table --verify-limit 8
  cargo run --bin pack_probe -- --input move.json --scale 4
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone, Serialize)]
struct Measurement {
    items: usize,
    net_value: Option<f64>,
    peak_states: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    verification: VerificationStatus,
    detail: Option<String>,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }
}

fn solve_file(path: &str, options: &Options) -> Result<(), String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let instance: PackingInstance =
        serde_json::from_str(&raw).map_err(|e| format!("cannot parse {path}: {e}"))?;
    let solver = DpSolver::with_config(options.config).map_err(|e| e.to_string())?;
    let plan = solver.solve(&instance).map_err(|e| e.to_string())?;

    #[derive(Serialize)]
    struct Report<'a> {
        net_value: f64,
        usage: pack_dp::model::PhysicalUsage,
        assignment: Vec<(&'a str, Destination)>,
    }
    let report = Report {
        net_value: plan.net_value,
        usage: plan.physical_usage(),
        assignment: instance
            .items
            .iter()
            .map(|it| it.name.as_str())
            .zip(plan.assignment.iter().copied())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_sizes(solver: &DpSolver, options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[4, 8, 10, 12, 16, 24, 32, 40, 50];
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &n)| {
            eprint!("      [{}/{}] Testing {} items... ", idx + 1, total, n);
            let instance = deterministic_instance(n);
            let m = measure(n, sys, || {
                let (plan, stats) = match solver.solve_with_stats(&instance) {
                    Ok(r) => r,
                    Err(err) => {
                        return (None, 0, VerificationStatus::Failed, Some(err.to_string()));
                    }
                };
                let (status, detail) = if n <= options.verify_limit {
                    verify(&instance, plan.net_value, options.config.scale)
                } else {
                    (VerificationStatus::NotChecked, None)
                };
                (Some(plan.net_value), stats.peak_width, status, detail)
            });
            let status_icon = match m.verification {
                VerificationStatus::Passed => "✓",
                VerificationStatus::Failed => "✗",
                VerificationStatus::NotChecked => "○",
            };
            eprintln!(
                "{} net_value={}, peak_states={}, time={:.3}s, status={}",
                status_icon,
                m.net_value.map_or_else(|| "-".to_string(), |v| v.to_string()),
                m.peak_states,
                m.wall_s,
                m.verification.label()
            );
            m
        })
        .collect()
}

fn verify(instance: &PackingInstance, net_value: f64, scale: u32) -> (VerificationStatus, Option<String>) {
    let baseline = ExhaustiveSolver::new(scale, instance.len()).and_then(|s| s.solve(instance));
    match baseline {
        Ok(plan) if (plan.net_value - net_value).abs() <= 1e-9 => (VerificationStatus::Passed, None),
        Ok(plan) => (
            VerificationStatus::Failed,
            Some(format!("expected {}, got {net_value}", plan.net_value)),
        ),
        Err(err) => (VerificationStatus::Failed, Some(err.to_string())),
    }
}

/// Airline-like limits with a mix of eligibilities, reproducible without an RNG.
fn deterministic_instance(n: usize) -> PackingInstance {
    let items = (0..n)
        .map(|i| {
            let weight = ((i * 7 + 3) % 9 + 1) as f64 * 0.5;
            let volume = ((i * 5 + 1) % 13 + 1) as f64 * 0.5;
            let value = ((i * 37 + 11) % 250 + 10) as f64;
            let mut item = Item::new(format!("item{i}"), weight, volume, value)
                .allow(Destination::Movers);
            if i % 3 != 2 {
                item = item.allow(Destination::Cabin);
            }
            if i % 4 != 0 {
                item = item.allow(Destination::CheckIn);
            }
            item
        })
        .collect();
    PackingInstance::new(items, Capacity::new(7.0, 20.0), Capacity::new(23.0, 60.0), 2.0)
}

fn measure<F>(items: usize, sys: &mut System, compute: F) -> Measurement
where
    F: FnOnce() -> (Option<f64>, usize, VerificationStatus, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (net_value, peak_states, verification, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        items,
        net_value,
        peak_states,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        verification,
        detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("items,net_value,peak_states,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{},{:.3},{},{},\"{}\"",
            m.items,
            m.net_value.map(|v| v.to_string()).unwrap_or_default(),
            m.peak_states,
            m.wall_s,
            m.rss_delta_kib,
            m.verification.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    println!(
        "{:>6}  {:>12}  {:>12}  {:>10}  {:>14}  {:<12}  detail",
        "items", "net_value", "peak_states", "wall_s", "rss_delta_kib", "status"
    );
    for m in measurements {
        println!(
            "{:>6}  {:>12}  {:>12}  {:>10.3}  {:>14}  {:<12}  {}",
            m.items,
            m.net_value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
            m.peak_states,
            m.wall_s,
            m.rss_delta_kib,
            m.verification.label(),
            m.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(measurements).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}
