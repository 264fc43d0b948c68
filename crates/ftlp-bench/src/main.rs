mod instance;

use clap::{Parser, Subcommand, ValueEnum};
use ftlp::{SolverStatus, api};
use ftlp_tools::{MemoryProbe, MemorySnapshot, rss_delta};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use instance::{ShapeParams, TreeShape, build_instance, random_weights};

const SCHEMA_VERSION: u32 = 1;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ftlp benchmark runner and reporting interface"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and solve synthetic subtree-selection MILPs
    Run(RunArgs),
    /// Summarize a JSONL benchmark artifact
    Report(ReportArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Number of instances to solve
    #[arg(long, default_value_t = 32)]
    instances: u32,

    /// Nodes per instance (the root included)
    #[arg(long, default_value_t = 60)]
    nodes: usize,

    /// Candidate parents per non-root node
    #[arg(long, default_value_t = 3)]
    parents: usize,

    /// Number of node colours
    #[arg(long, default_value_t = 6)]
    colours: usize,

    /// Maximum number of selected nodes per colour
    #[arg(long, default_value_t = 4)]
    colour_cap: usize,

    /// Per-instance solver time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Worker threads (defaults to the number of logical CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for the shared graph shape and the per-instance weights
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Append JSONL records to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Tracing filter (overrides FTLP_TRACE)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input JSONL benchmark artifact
    #[arg(long)]
    input: PathBuf,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BenchRecord {
    schema_version: u32,
    run_id: String,
    instance: u32,
    nodes: usize,
    columns: usize,
    rows: usize,
    status: String,
    score: f64,
    build_ms: f64,
    solve_ms: f64,
    rss_before_bytes: Option<u64>,
    rss_after_bytes: Option<u64>,
    rss_delta_bytes: Option<i64>,
}

#[derive(Debug, Clone, Eq, Ord, PartialEq, PartialOrd)]
struct SummaryKey {
    run_id: String,
    nodes: usize,
    columns: usize,
}

#[derive(Debug, Clone, Serialize)]
struct SummaryRow {
    run_id: String,
    nodes: usize,
    columns: usize,
    samples: usize,
    optimal: usize,
    time_limit: usize,
    other: usize,
    mean_build_ms: f64,
    mean_solve_ms: f64,
    max_solve_ms: f64,
    mean_score: Option<f64>,
    mean_rss_delta_bytes: Option<f64>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_command(args),
        Command::Report(args) => report_command(args),
    }
}

fn run_command(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.instances == 0 {
        return Err(boxed_input_error("instances must be greater than zero"));
    }
    if args.nodes < 2 {
        return Err(boxed_input_error("nodes must be at least 2"));
    }
    if args.time_limit.is_some_and(|limit| limit.is_nan() || limit < 0.0) {
        return Err(boxed_input_error("time-limit must be non-negative"));
    }
    ftlp::logging::enable_logging(args.log_level.as_deref())?;

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;
    let run_id = build_run_id()?;

    let mut shape_rng = StdRng::seed_from_u64(args.seed);
    let shape = TreeShape::generate(
        ShapeParams {
            nodes: args.nodes,
            parents_per_node: args.parents,
            colours: args.colours,
            colour_cap: args.colour_cap,
        },
        &mut shape_rng,
    );

    let mut probe = MemoryProbe::new();
    probe.record("run_start")?;
    tracing::info!(
        component = "bench",
        operation = "run",
        status = "start",
        run_id = %run_id,
        instances = args.instances,
        columns = shape.num_columns(),
        rows = shape.num_rows(),
        threads,
        "Starting benchmark run"
    );

    let started = Instant::now();
    let records = pool.install(|| {
        (0..args.instances)
            .into_par_iter()
            .map(|instance| execute_instance(&run_id, &shape, &args, instance))
            .collect::<Result<Vec<_>, ftlp::ApiError>>()
    })?;
    let wall_ms = started.elapsed().as_secs_f64() * 1000.0;
    probe.record("run_end")?;

    let cache = api::cache_stats();
    tracing::info!(
        component = "bench",
        operation = "run",
        status = "success",
        run_id = %run_id,
        wall_ms,
        cache_hits = cache.hits,
        cache_misses = cache.misses,
        cache_entries = cache.entries,
        rss_delta_bytes = ?probe.total_diff(),
        "Benchmark run completed"
    );

    if let Some(path) = &args.output {
        append_records_jsonl(path, &records)?;
    }
    render_output(args.format, &records)?;
    if args.format == OutputFormat::Table {
        println!(
            "wall: {:.3} ms, threads: {}, cache hit rate: {:.3}, peak rss: {} MB",
            wall_ms,
            threads,
            cache.hit_rate(),
            format_option_mb_u64(probe.peak_rss())
        );
        if let Some(path) = &args.output {
            println!("artifact: {}", path.display());
        }
    }
    Ok(())
}

fn execute_instance(
    run_id: &str,
    shape: &TreeShape,
    args: &RunArgs,
    instance: u32,
) -> Result<BenchRecord, ftlp::ApiError> {
    let mut rng =
        StdRng::seed_from_u64(args.seed ^ u64::from(instance).wrapping_mul(0x2545_F491));
    let weights = random_weights(shape.num_columns(), &mut rng);
    let rss_before = capture_rss("instance_start");

    let build_started = Instant::now();
    let handle = build_instance(shape, &weights, args.time_limit)?;
    let build_ms = build_started.elapsed().as_secs_f64() * 1000.0;

    let solve_started = Instant::now();
    let code = api::solve(handle);
    let solve_ms = solve_started.elapsed().as_secs_f64() * 1000.0;
    let outcome = code.and_then(|code| Ok((code, api::get_score(handle)?)));
    api::dispose_model(handle)?;
    let (code, score) = outcome?;

    let rss_after = capture_rss("instance_end");
    let status = SolverStatus::from_code(code).unwrap_or(SolverStatus::Error);
    tracing::debug!(
        component = "bench",
        operation = "instance",
        status = "success",
        instance,
        handle,
        solver_status = status.as_str(),
        score,
        build_ms,
        solve_ms,
        "Instance solved"
    );

    Ok(BenchRecord {
        schema_version: SCHEMA_VERSION,
        run_id: run_id.to_string(),
        instance,
        nodes: shape.in_edges.len(),
        columns: shape.num_columns(),
        rows: shape.num_rows(),
        status: status.as_str().to_string(),
        score,
        build_ms,
        solve_ms,
        rss_before_bytes: rss_before,
        rss_after_bytes: rss_after,
        rss_delta_bytes: rss_delta(rss_before, rss_after),
    })
}

fn capture_rss(stage: &str) -> Option<u64> {
    MemorySnapshot::capture(stage)
        .ok()
        .map(|snapshot| snapshot.rss_bytes)
}

fn report_command(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records_jsonl(&args.input)?;
    render_output(args.format, &records)?;
    Ok(())
}

fn render_output(
    format: OutputFormat,
    records: &[BenchRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = summarize_records(records);
    match format {
        OutputFormat::Table => {
            print_summary_table(&rows);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
    }
}

fn summarize_records(records: &[BenchRecord]) -> Vec<SummaryRow> {
    #[derive(Default)]
    struct Acc {
        samples: usize,
        optimal: usize,
        time_limit: usize,
        build_sum: f64,
        solve_sum: f64,
        solve_max: f64,
        score_sum: f64,
        score_count: usize,
        rss_delta_sum: f64,
        rss_delta_count: usize,
    }

    let mut groups: BTreeMap<SummaryKey, Acc> = BTreeMap::new();
    for record in records {
        let key = SummaryKey {
            run_id: record.run_id.clone(),
            nodes: record.nodes,
            columns: record.columns,
        };
        let entry = groups.entry(key).or_default();
        entry.samples += 1;
        match record.status.as_str() {
            "optimal" => entry.optimal += 1,
            "time_limit" => entry.time_limit += 1,
            _ => {}
        }
        entry.build_sum += record.build_ms;
        entry.solve_sum += record.solve_ms;
        if record.solve_ms > entry.solve_max {
            entry.solve_max = record.solve_ms;
        }
        if record.score.is_finite() {
            entry.score_sum += record.score;
            entry.score_count += 1;
        }
        if let Some(delta) = record.rss_delta_bytes {
            entry.rss_delta_sum += delta as f64;
            entry.rss_delta_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| {
            let samples = acc.samples.max(1) as f64;
            SummaryRow {
                run_id: key.run_id,
                nodes: key.nodes,
                columns: key.columns,
                samples: acc.samples,
                optimal: acc.optimal,
                time_limit: acc.time_limit,
                other: acc.samples - acc.optimal - acc.time_limit,
                mean_build_ms: acc.build_sum / samples,
                mean_solve_ms: acc.solve_sum / samples,
                max_solve_ms: acc.solve_max,
                mean_score: (acc.score_count > 0)
                    .then(|| acc.score_sum / acc.score_count as f64),
                mean_rss_delta_bytes: (acc.rss_delta_count > 0)
                    .then(|| acc.rss_delta_sum / acc.rss_delta_count as f64),
            }
        })
        .collect()
}

fn print_summary_table(rows: &[SummaryRow]) {
    println!(
        "{:<22} {:>6} {:>8} {:>7} {:>8} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "run",
        "nodes",
        "columns",
        "samples",
        "optimal",
        "limit",
        "other",
        "build_ms",
        "solve_ms",
        "max_ms",
        "score",
        "rss_delta_mb"
    );
    for row in rows {
        println!(
            "{:<22} {:>6} {:>8} {:>7} {:>8} {:>6} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10} {:>12}",
            row.run_id,
            row.nodes,
            row.columns,
            row.samples,
            row.optimal,
            row.time_limit,
            row.other,
            row.mean_build_ms,
            row.mean_solve_ms,
            row.max_solve_ms,
            row.mean_score
                .map_or_else(|| "-".to_string(), |score| format!("{score:.3}")),
            format_option_mb_f64(row.mean_rss_delta_bytes),
        );
    }
}

fn format_option_mb_f64(value: Option<f64>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |bytes| format!("{:.3}", bytes / (1024.0 * 1024.0)),
    )
}

fn format_option_mb_u64(value: Option<u64>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |bytes| format!("{:.3}", bytes as f64 / (1024.0 * 1024.0)),
    )
}

fn append_records_jsonl(
    path: &Path,
    records: &[BenchRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn load_records_jsonl(path: &Path) -> Result<Vec<BenchRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str::<BenchRecord>(&line)?);
    }
    Ok(records)
}

fn build_run_id() -> Result<String, Box<dyn std::error::Error>> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| std::io::Error::other(err.to_string()))?
        .as_millis();
    Ok(format!("bench_{}", millis))
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
