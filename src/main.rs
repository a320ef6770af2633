//! fx-reconcile CLI
//!
//! Run USD→JPY conversion and FX reconciliation from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Convert a statement using a bundled rate table
//! fx-reconcile process --input statement.json
//!
//! # Output as JSON
//! fx-reconcile process --input statement.json --format json
//!
//! # Generate a random statement for testing
//! fx-reconcile generate --rows 200 --output test.json
//! ```

use chrono::NaiveDate;
use fx_reconcile::core::rate_table::{RateFallback, RateTable};
use fx_reconcile::core::transaction::{RawTransaction, Statement};
use fx_reconcile::engine::report::{convert_statement, EngineOptions};
use fx_reconcile::generator::{generate_random_statement, StatementConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"fx-reconcile — USD→JPY conversion and realized FX gain/loss reconciliation

USAGE:
    fx-reconcile <COMMAND> [OPTIONS]

COMMANDS:
    process     Convert a statement and compute realized FX profit
    generate    Generate a random statement + rate table (for testing)
    help        Show this message

OPTIONS (process):
    --input <FILE>        Path to JSON file with transactions and rates
    --format <FORMAT>     Output format: text (default) or json
    --fallback <POLICY>   Rate fallback: prior_date (default) or exact

OPTIONS (generate):
    --rows <N>            Number of rows (default: 100)
    --vendors <N>         Number of distinct vendors (default: 8)
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    fx-reconcile process --input statement.json
    fx-reconcile process --input statement.json --format json
    fx-reconcile generate --rows 500 --vendors 12 --output test.json"#
    );
}

/// JSON schema for one input row.
#[derive(serde::Deserialize, serde::Serialize)]
struct RowInput {
    date: String,
    #[serde(default)]
    vendor: String,
    #[serde(default = "zero")]
    credit: String,
    #[serde(default = "zero")]
    debit: String,
}

fn zero() -> String {
    "0".to_string()
}

/// JSON schema for one rate entry.
#[derive(serde::Deserialize, serde::Serialize)]
struct RateInput {
    date: String,
    rate: String,
}

/// JSON schema for the input file: a statement plus its rate table.
#[derive(serde::Deserialize, serde::Serialize)]
struct StatementFile {
    transactions: Vec<RowInput>,
    rates: Vec<RateInput>,
}

fn parse_amount(label: &str, value: &str) -> Decimal {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Invalid {} amount '{}': {}", label, value, e);
        process::exit(1);
    })
}

fn load_statement(path: &str) -> (Statement, RateTable) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: StatementFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transactions": [
    {{ "date": "2024-01-05", "vendor": "Acme Corp", "credit": "1000.00", "debit": "0" }}
  ],
  "rates": [
    {{ "date": "2024-01-05", "rate": "144.85" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut statement = Statement::new();
    for row in file.transactions {
        statement.add(RawTransaction {
            date: row.date,
            vendor: row.vendor,
            credit_usd: parse_amount("credit", &row.credit),
            debit_usd: parse_amount("debit", &row.debit),
        });
    }

    let mut rates = RateTable::new();
    for entry in file.rates {
        let date: NaiveDate = entry.date.parse().unwrap_or_else(|e| {
            eprintln!("Invalid rate date '{}': {}", entry.date, e);
            process::exit(1);
        });
        let rate: Decimal = entry.rate.parse().unwrap_or_else(|e| {
            eprintln!("Invalid rate '{}': {}", entry.rate, e);
            process::exit(1);
        });
        rates.insert(date, rate).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });
    }

    (statement, rates)
}

fn cmd_process(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut fallback = RateFallback::PriorDate;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--fallback" => {
                i += 1;
                fallback = match args.get(i).map(String::as_str) {
                    Some("exact") => RateFallback::Exact,
                    Some("prior_date") => RateFallback::PriorDate,
                    _ => {
                        eprintln!("--fallback requires 'prior_date' or 'exact'");
                        process::exit(1);
                    }
                };
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let (statement, rates) = load_statement(&path);
    let options = EngineOptions {
        fallback,
        ..Default::default()
    };

    let report = convert_statement(&statement, &rates, &options).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        println!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut rows = 100usize;
    let mut vendors = 8usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rows" => {
                i += 1;
                rows = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--rows requires a number");
                    process::exit(1);
                });
            }
            "--vendors" => {
                i += 1;
                vendors = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--vendors requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = StatementConfig {
        row_count: rows,
        vendor_count: vendors,
        ..Default::default()
    };
    let (statement, rates) = generate_random_statement(&config);

    let file = StatementFile {
        transactions: statement
            .rows()
            .iter()
            .map(|row| RowInput {
                date: row.date.clone(),
                vendor: row.vendor.clone(),
                credit: row.credit_usd.to_string(),
                debit: row.debit_usd.to_string(),
            })
            .collect(),
        rates: rates
            .iter()
            .map(|(date, rate)| RateInput {
                date: date.to_string(),
                rate: rate.to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&file).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated {} rows → {}", statement.len(), path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "process" => cmd_process(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
