//! Command-line interface for semhl
//!
//! Scores learned-model predictions and baseline lexer payloads against oracle files,
//! and inspects oracle files. Results are printed as JSON on stdout, logs go to stderr.
//!
//! Usage:
//!   semhl score-baseline `<oracle>` --payloads `<file>` [--task `<code>`]...  - Score baseline payloads
//!   semhl score-model `<oracle>` --predictions `<file>` --task `<code>`      - Score model predictions
//!   semhl sizes `<oracle>`                                                   - Per-file size statistics
//!   semhl index `<oracle>`                                                   - Distinct sources with their urls
//!   semhl tasks                                                              - List evaluation tasks
//!   semhl render `<oracle>` [--record `<n>`] [--task `<code>`]                  - Render a reference as HTML

use clap::{Arg, ArgAction, ArgMatches, Command};
use semhl::semhl::config::{Loader, SemhlConfig};
use semhl::semhl::evaluation::{
    self, BaselinePredictor, BatchReport, Evaluator, ModelPredictor, OracleRecord, Predictor,
};
use semhl::semhl::logging::init_logging;
use semhl::semhl::render::to_html;
use semhl::{HCharSeq, TaskCode};
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;
use std::fs;

fn main() {
    let matches = Command::new("semhl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Semantic highlighting accuracy tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .global(true)
                .action(ArgAction::Append)
                .value_name("KEY=VALUE")
                .help("Override a single configuration key"),
        )
        .subcommand(
            Command::new("score-baseline")
                .about("Score baseline lexer payloads against an oracle")
                .arg(oracle_arg())
                .arg(
                    Arg::new("payloads")
                        .long("payloads")
                        .required(true)
                        .help("JSON array of {fileId, resJson} payloads"),
                )
                .arg(snippets_arg())
                .arg(task_arg().action(ArgAction::Append)),
        )
        .subcommand(
            Command::new("score-model")
                .about("Score learned-model predictions against an oracle")
                .arg(oracle_arg())
                .arg(
                    Arg::new("predictions")
                        .long("predictions")
                        .required(true)
                        .help("JSON array of {fileId, ps} predictions"),
                )
                .arg(snippets_arg())
                .arg(task_arg().required(true)),
        )
        .subcommand(
            Command::new("sizes")
                .about("Per-file size statistics, largest first")
                .arg(oracle_arg()),
        )
        .subcommand(
            Command::new("index")
                .about("Distinct oracle sources with their urls")
                .arg(oracle_arg()),
        )
        .subcommand(Command::new("tasks").about("List evaluation tasks and their categories"))
        .subcommand(
            Command::new("render")
                .about("Render an oracle reference classification as HTML")
                .arg(oracle_arg())
                .arg(
                    Arg::new("record")
                        .long("record")
                        .short('r')
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0")
                        .help("Index of the record to render"),
                )
                .arg(task_arg()),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| fail("Configuration error", e));
    if let Err(e) = init_logging(&config.logging.filter) {
        eprintln!("{}", e);
    }

    match matches.subcommand() {
        Some(("score-baseline", sub)) => handle_score_baseline(sub, &config),
        Some(("score-model", sub)) => handle_score_model(sub, &config),
        Some(("sizes", sub)) => print_json(&evaluation::sizes(&read_oracle(sub, "oracle"))),
        Some(("index", sub)) => print_json(&evaluation::index(&read_oracle(sub, "oracle"))),
        Some(("tasks", _)) => handle_tasks(),
        Some(("render", sub)) => handle_render(sub),
        _ => unreachable!(),
    }
}

fn oracle_arg() -> Arg {
    Arg::new("oracle")
        .help("Oracle file: a JSON array or JSON lines of records")
        .required(true)
        .index(1)
}

fn snippets_arg() -> Arg {
    Arg::new("snippets")
        .long("snippets")
        .help("Oracle file of snippets, scored and reported alongside")
}

fn task_arg() -> Arg {
    Arg::new("task")
        .long("task")
        .short('t')
        .value_parser(clap::value_parser!(TaskCode))
        .help("Task code (28, 37, 55, 66) or name (lexical, declarators, identifiers, full)")
}

fn load_config(matches: &ArgMatches) -> Result<SemhlConfig, config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            config::ConfigError::Message(format!("expected KEY=VALUE, got '{}'", assignment))
        })?;
        loader = loader.set_override(key, value)?;
    }
    loader.build()
}

fn fail(context: &str, error: impl Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Error reading {}", path), e))
}

fn read_oracle(matches: &ArgMatches, name: &str) -> Vec<OracleRecord> {
    let path = matches
        .get_one::<String>(name)
        .unwrap_or_else(|| fail("Missing argument", name));
    evaluation::load_oracle(path).unwrap_or_else(|e| fail(&format!("Error loading {}", path), e))
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => fail("Serialization error", e),
    }
}

fn evaluator(config: &SemhlConfig, task: TaskCode) -> Evaluator {
    Evaluator::new(task)
        .with_progress_every(config.evaluation.progress_every)
        .with_skip_degenerate(config.evaluation.skip_degenerate)
}

/// Scores the oracle and, when given, the snippets file as one report.
fn run_batch(
    matches: &ArgMatches,
    evaluator: &Evaluator,
    predictor: &mut dyn Predictor,
) -> BatchReport {
    let records = read_oracle(matches, "oracle");
    let mut report = evaluator.run(&records, predictor, false);
    if matches.get_one::<String>("snippets").is_some() {
        let snippets = read_oracle(matches, "snippets");
        report.merge(evaluator.run(&snippets, predictor, true));
    }
    report
}

fn report_json(report: &BatchReport) -> serde_json::Value {
    json!({
        "summary": report.summary(),
        "files": report.records(),
    })
}

fn handle_score_baseline(matches: &ArgMatches, config: &SemhlConfig) {
    let payloads = read_file(
        matches
            .get_one::<String>("payloads")
            .unwrap_or_else(|| fail("Missing argument", "payloads")),
    );
    let mut predictor = BaselinePredictor::from_json(&payloads)
        .unwrap_or_else(|e| fail("Error loading payloads", e));

    let tasks: Vec<TaskCode> = match matches.get_many::<TaskCode>("task") {
        Some(tasks) => tasks.copied().collect(),
        None => config
            .evaluation
            .task_codes()
            .unwrap_or_else(|e| fail("Configuration error", e)),
    };

    let reports: Vec<_> = tasks
        .into_iter()
        .map(|task| report_json(&run_batch(matches, &evaluator(config, task), &mut predictor)))
        .collect();
    print_json(&reports);
}

fn handle_score_model(matches: &ArgMatches, config: &SemhlConfig) {
    let predictions = read_file(
        matches
            .get_one::<String>("predictions")
            .unwrap_or_else(|| fail("Missing argument", "predictions")),
    );
    let mut predictor = ModelPredictor::from_json(&predictions)
        .unwrap_or_else(|e| fail("Error loading predictions", e));
    let task = *matches
        .get_one::<TaskCode>("task")
        .unwrap_or_else(|| fail("Missing argument", "task"));

    let report = run_batch(matches, &evaluator(config, task), &mut predictor);
    print_json(&report_json(&report));
}

fn handle_tasks() {
    let tasks: Vec<_> = TaskCode::ALL
        .iter()
        .map(|task| {
            json!({
                "code": task.code(),
                "categories": task
                    .categories()
                    .iter()
                    .map(|hcode| hcode.as_str())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    print_json(&tasks);
}

fn handle_render(matches: &ArgMatches) {
    let records = read_oracle(matches, "oracle");
    let index = matches.get_one::<usize>("record").copied().unwrap_or(0);
    let record = records.get(index).unwrap_or_else(|| {
        fail(
            "Invalid record",
            format!("{} out of {} records", index, records.len()),
        )
    });
    let mut chars = HCharSeq::project(record.hetas.as_slice(), record.text());
    if let Some(task) = matches.get_one::<TaskCode>("task") {
        chars.adapt(*task);
    }
    println!("{}", to_html(record.text(), &chars));
}
