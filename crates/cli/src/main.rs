use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use tickbed_config::{Scenario, ScenarioAssertion};
use tickbed_core::board::Board;
use tickbed_core::program::{self, RunConfig, RunOutcome};

mod report;

use report::{AssertionResult, ReportConfig, TestReport};

const EXIT_ASSERT_FAIL: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

/// Scenario cycle budgets beyond this are assumed to be typos.
const MAX_ALLOWED_CYCLES: u64 = 2_000_000_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "TickBed bare-metal runtime test bench", long_about = None)]
struct Cli {
    /// Enable cycle-level dispatch tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reference program and print its console output
    Run(RunArgs),
    /// Run a scripted scenario and write result artifacts
    Test(TestArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Board descriptor (YAML); defaults to the built-in reference board
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Timer period in seconds
    #[arg(long, default_value = "2")]
    period_secs: u32,

    /// Stop after this many main-loop lines
    #[arg(long)]
    iterations: Option<u64>,

    /// Cycle budget for the run
    #[arg(long, default_value = "500000000")]
    max_cycles: u64,

    /// Idle cycles between main-loop lines
    #[arg(long, default_value = "100000")]
    delay_cycles: u64,

    /// Seed for the pseudo-random sequence
    #[arg(long, default_value = "12345")]
    seed: u32,

    /// Scripted console input; enables the adder exchange
    #[arg(long)]
    input: Option<String>,

    /// Write a machine snapshot (JSON) after the run
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Suppress console output on stdout
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args, Debug)]
struct TestArgs {
    /// Scenario script (YAML)
    #[arg(long)]
    script: PathBuf,

    /// Directory for result.json and junit.xml
    #[arg(long, default_value = "tickbed-out")]
    output_dir: PathBuf,

    /// Extra copy of the JUnit report
    #[arg(long)]
    junit: Option<PathBuf>,

    /// Suppress console output on stdout
    #[arg(long)]
    no_uart_stdout: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let code = match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Test(args) => cmd_test(args),
    }
    .unwrap_or_else(|err| {
        tracing::error!("{err:#}");
        EXIT_CONFIG_ERROR
    });
    std::process::exit(code);
}

fn load_board(path: &Path) -> anyhow::Result<(Board, u32)> {
    info!("Loading board descriptor: {:?}", path);
    let desc = tickbed_config::BoardDescriptor::from_file(path)?;
    let board = Board::from_descriptor(&desc)?;
    Ok((board, desc.crystal_hz))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    info!("Starting TickBed");

    let mut cfg = RunConfig {
        period_secs: args.period_secs,
        iterations: args.iterations,
        max_cycles: args.max_cycles,
        delay_cycles: args.delay_cycles,
        seed: args.seed,
        input: args.input.clone(),
        ..RunConfig::default()
    };
    let board = match &args.board {
        Some(path) => {
            let (board, crystal_hz) = load_board(path)?;
            cfg.crystal_hz = crystal_hz;
            board
        }
        None => {
            info!("Using the built-in reference board");
            Board::reference()
        }
    };

    let outcome = program::run_on(board, &cfg);
    if !args.quiet {
        print!("{}", outcome.uart_string());
    }
    info!(
        "Run finished: {} after {} cycles, {} ticks ({} dropped)",
        outcome.stop_reason, outcome.cycles, outcome.ticks, outcome.dropped
    );

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&outcome.snapshot)?;
        std::fs::write(path, json)?;
        info!("Snapshot written to {:?}", path);
    }
    Ok(0)
}

fn cmd_test(args: TestArgs) -> anyhow::Result<i32> {
    use anyhow::Context;
    use sha2::{Digest, Sha256};

    let script_bytes = std::fs::read(&args.script)
        .with_context(|| format!("Failed to read scenario at {:?}", args.script))?;
    let scenario = Scenario::from_file(&args.script)?;
    if scenario.limits.max_cycles > MAX_ALLOWED_CYCLES {
        anyhow::bail!(
            "max_cycles {} exceeds the ceiling of {}",
            scenario.limits.max_cycles,
            MAX_ALLOWED_CYCLES
        );
    }

    let mut cfg = RunConfig {
        period_secs: scenario.run.period_secs,
        iterations: scenario.run.iterations,
        max_cycles: scenario.limits.max_cycles,
        delay_cycles: scenario.run.delay_cycles,
        seed: scenario.run.seed,
        input: scenario.run.input.clone(),
        ..RunConfig::default()
    };
    let board = match &scenario.board {
        // board paths resolve relative to the scenario file
        Some(rel) => {
            let dir = args.script.parent().unwrap_or_else(|| Path::new("."));
            let (board, crystal_hz) = load_board(&dir.join(rel))?;
            cfg.crystal_hz = crystal_hz;
            board
        }
        None => Board::reference(),
    };

    info!("Running scenario: {:?}", args.script);
    let outcome = program::run_on(board, &cfg);
    if !args.no_uart_stdout {
        print!("{}", outcome.uart_string());
    }

    let assertions = evaluate_assertions(&scenario, &outcome);
    let failed = assertions.iter().filter(|a| !a.passed).count();
    let report = TestReport {
        status: if failed == 0 { "pass" } else { "fail" }.to_string(),
        stop_reason: outcome.stop_reason.to_string(),
        ticks: outcome.ticks,
        dropped: outcome.dropped,
        cycles: outcome.cycles,
        uart_len: outcome.uart_tx.len(),
        scenario_hash: format!("{:x}", Sha256::digest(&script_bytes)),
        config: ReportConfig {
            script: args.script.display().to_string(),
            board: scenario.board.clone(),
        },
        assertions,
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output dir {:?}", args.output_dir))?;
    report::write_result_json(&args.output_dir.join("result.json"), &report)?;
    report::write_junit(&args.output_dir.join("junit.xml"), &report)?;
    if let Some(extra) = &args.junit {
        report::write_junit(extra, &report)?;
    }

    for a in report.assertions.iter().filter(|a| !a.passed) {
        tracing::error!("Assertion failed: {}", a.name);
    }
    if failed == 0 {
        info!("Scenario passed ({} assertions)", report.assertions.len());
        Ok(0)
    } else {
        info!(
            "Scenario failed: {}/{} assertions",
            failed,
            report.assertions.len()
        );
        Ok(EXIT_ASSERT_FAIL)
    }
}

fn evaluate_assertions(scenario: &Scenario, outcome: &RunOutcome) -> Vec<AssertionResult> {
    let uart = outcome.uart_string();
    let mut results = Vec::with_capacity(scenario.assertions.len());
    for assertion in &scenario.assertions {
        let result = match assertion {
            ScenarioAssertion::UartContains(a) => {
                let passed = uart.contains(&a.uart_contains);
                AssertionResult {
                    name: format!("uart_contains \"{}\"", a.uart_contains.escape_debug()),
                    passed,
                    detail: (!passed).then(|| {
                        format!(
                            "console output ({} bytes) lacks the expected text",
                            uart.len()
                        )
                    }),
                }
            }
            ScenarioAssertion::TickCount(a) => {
                let passed = outcome.ticks == a.tick_count;
                AssertionResult {
                    name: format!("tick_count == {}", a.tick_count),
                    passed,
                    detail: (!passed).then(|| format!("observed {} ticks", outcome.ticks)),
                }
            }
            ScenarioAssertion::ExpectedStopReason(a) => {
                let passed = outcome.stop_reason == a.expected_stop_reason;
                AssertionResult {
                    name: format!("stop_reason == {}", a.expected_stop_reason),
                    passed,
                    detail: (!passed).then(|| format!("run stopped with {}", outcome.stop_reason)),
                }
            }
        };
        results.push(result);
    }
    results
}
