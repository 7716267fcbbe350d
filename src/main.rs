use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

use batchd::config::SchedulerConfig;
use batchd::error::BatchdError;
use batchd::intake::IntakeRequest;
use batchd::node::Node;
use batchd::scheduler::Job;
use batchd::shutdown::install_shutdown_handler;
use batchd::worker::ExecutionReport;

#[derive(Parser, Debug)]
#[command(name = "batchd")]
#[command(version)]
#[command(about = "A single-node batch job scheduler")]
struct Args {
    /// Seconds between dispatch checks while the queue head is not ready
    #[arg(long, default_value = "1")]
    poll_interval_secs: u64,

    /// Maximum number of concurrently running jobs (unbounded when omitted)
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Output format for job listings and execution reports
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Submission frontend (stdin line protocol)
// =============================================================================

/// Read requests from stdin, one per line:
///
/// ```text
/// + <delay-secs> <program> [args...]   submit a job
/// p                                    print the queued jobs
/// -                                    cancel the head job
/// ```
///
/// Malformed lines are reported to stderr and skipped; the queue is never
/// touched by a rejected request.
async fn run_frontend(intake_tx: mpsc::Sender<IntakeRequest>, output: OutputFormat) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: failed to read request: {}", e);
                break;
            }
        };

        let mut words = line.split_whitespace().map(str::to_string);
        match words.next().as_deref() {
            None => {}
            Some("+") => handle_submit(&intake_tx, words.collect()).await,
            Some("p") => handle_list(&intake_tx, output).await,
            Some("-") => handle_cancel(&intake_tx).await,
            Some(other) => {
                eprintln!(
                    "Error: unrecognized request {:?} (expected +, p or -)",
                    other
                );
            }
        }
    }
}

async fn handle_submit(intake_tx: &mpsc::Sender<IntakeRequest>, rest: Vec<String>) {
    let mut rest = rest.into_iter();

    let delay_word = match rest.next() {
        Some(word) => word,
        None => {
            eprintln!("Error: usage: + <delay-secs> <program> [args...]");
            return;
        }
    };
    let start_delay_secs = match delay_word.parse::<u32>() {
        Ok(delay) => delay,
        Err(_) => {
            eprintln!("Error: {}", BatchdError::InvalidDelay(delay_word));
            return;
        }
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    let request = IntakeRequest::Submit {
        command: rest.collect(),
        start_delay_secs,
        reply: reply_tx,
    };
    if intake_tx.send(request).await.is_err() {
        eprintln!("Error: {}", BatchdError::IntakeClosed);
        return;
    }

    match reply_rx.await {
        Ok(Ok(ack)) => println!("Job {} queued, ready at {}", ack.job_id, ack.ready_time),
        Ok(Err(e)) => eprintln!("Error: submission rejected: {}", e),
        Err(_) => eprintln!("Error: {}", BatchdError::IntakeClosed),
    }
}

async fn handle_list(intake_tx: &mpsc::Sender<IntakeRequest>, output: OutputFormat) {
    let (reply_tx, reply_rx) = oneshot::channel();
    if intake_tx
        .send(IntakeRequest::List { reply: reply_tx })
        .await
        .is_err()
    {
        eprintln!("Error: {}", BatchdError::IntakeClosed);
        return;
    }

    let jobs = match reply_rx.await {
        Ok(jobs) => jobs,
        Err(_) => {
            eprintln!("Error: {}", BatchdError::IntakeClosed);
            return;
        }
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&jobs) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("Error: failed to encode job list: {}", e),
        },
        OutputFormat::Table => print_job_table(&jobs),
    }
}

fn print_job_table(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("No jobs queued.");
        return;
    }

    println!("Number of jobs: {}", jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        println!(
            "{:>3}. {}  (submitted {}, delay {}s, ready {})",
            index + 1,
            job.command.join(" "),
            job.submit_time,
            job.start_delay_secs,
            job.ready_time()
        );
    }
}

async fn handle_cancel(intake_tx: &mpsc::Sender<IntakeRequest>) {
    let (reply_tx, reply_rx) = oneshot::channel();
    if intake_tx
        .send(IntakeRequest::CancelHead { reply: reply_tx })
        .await
        .is_err()
    {
        eprintln!("Error: {}", BatchdError::IntakeClosed);
        return;
    }

    match reply_rx.await {
        Ok(Some(job)) => println!("Cancelled job {}: {}", job.id, job.command.join(" ")),
        Ok(None) => println!("No job available to cancel."),
        Err(_) => eprintln!("Error: {}", BatchdError::IntakeClosed),
    }
}

// =============================================================================
// Execution result sink
// =============================================================================

/// Drain execution reports and print one block per finished job.
async fn run_reporter(mut results_rx: mpsc::Receiver<ExecutionReport>, output: OutputFormat) {
    while let Some(report) = results_rx.recv().await {
        match output {
            OutputFormat::Json => match serde_json::to_string(&report) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => eprintln!("Error: failed to encode execution report: {}", e),
            },
            OutputFormat::Table => {
                println!("Job {} finished: {}", report.job.id, report.outcome);
                println!("  Command:     {}", report.job.command.join(" "));
                println!("  Submitted:   {}", report.job.submit_time);
                println!("  Start delay: {}s", report.job.start_delay_secs);
                println!("  Completed:   {}", report.completed_at);
            }
        }
    }
}

// =============================================================================
// Main entry point
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SchedulerConfig::default()
        .with_poll_interval(Duration::from_secs(args.poll_interval_secs))
        .with_max_in_flight(args.max_in_flight);

    tracing::info!(
        poll_interval_secs = args.poll_interval_secs,
        max_in_flight = ?args.max_in_flight,
        "Starting batchd"
    );

    let shutdown = install_shutdown_handler();
    let (node, intake_tx, results_rx) = Node::new(config);

    tokio::spawn(run_reporter(results_rx, args.output));
    tokio::spawn(run_frontend(intake_tx, args.output));

    node.run(shutdown).await;
}
