//! # Silverline Back Office
//!
//! Orchestration layer over the pricing engine, and the `silverline` CLI.
//!
//! ## Module Organization
//! ```text
//! silverline_back_office/
//! ├── lib.rs          ◄─── You are here (tracing, CLI parsing & dispatch)
//! ├── config.rs       ◄─── AppConfig (config crate)
//! ├── error.rs        ◄─── API error type for commands
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, opened once per process
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── terms.rs    ◄─── Terms resolver state
//! │   └── config.rs   ◄─── Validated configuration
//! └── commands/
//!     ├── quote.rs    ◄─── Admin preview, reseller quote
//!     ├── order.rs    ◄─── Checkout, status
//!     ├── invoice.rs  ◄─── Invoice rendering
//!     ├── rates.rs    ◄─── Silver rate admin
//!     ├── settings.rs ◄─── Pricing settings admin
//!     └── product.rs  ◄─── Catalog admin
//! ```
//!
//! ## CLI
//! ```text
//! silverline migrate
//! silverline seed
//! silverline rate set <rate_per_gram>
//! silverline rate show
//! silverline settings set <key> <value>
//! silverline settings show
//! silverline product list
//! silverline product add <id> <name> <tunch_pct> <labor_per_kg> [--hsn <code>]
//! silverline quote <product_id> <weight_kg> [--reseller <id>] [--rate <r>]
//! silverline order place <reseller_id> <product_id>:<weight_kg>...
//! silverline order status <order_id> <status>
//! silverline order list <reseller_id>
//! silverline invoice <order_id>
//! ```
//!
//! Results are printed as JSON on stdout. Errors are printed as an
//! `ApiError` JSON object on stderr. Logs go to stderr.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::order::OrderLineRequest;
use crate::commands::product::NewProduct;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;
use silverline_core::validation::{parse_decimal, parse_weight};
use silverline_core::{CoreError, OrderStatus, QuoteRequest, WeightInput};
use silverline_db::migrations::migration_status;
use silverline_db::seed::seed_demo;

/// Usage text for `--help`.
pub const USAGE: &str = "\
Silverline back office

Usage:
  silverline migrate
  silverline seed
  silverline rate set <rate_per_gram>
  silverline rate show
  silverline settings set <key> <value>
  silverline settings show
  silverline product list
  silverline product add <id> <name> <tunch_pct> <labor_per_kg> [--hsn <code>]
  silverline quote <product_id> <weight_kg> [--reseller <id>] [--rate <r>]
  silverline order place <reseller_id> <product_id>:<weight_kg>...
  silverline order status <order_id> <status>
  silverline order list <reseller_id>
  silverline invoice <order_id>

Settings keys: extra_charges_percent, gst_rate_percent, company_state_code
Configuration: ./silverline.toml, SILVERLINE_* environment variables";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Migrate,
    Seed,
    RateSet(String),
    RateShow,
    SettingsSet { key: String, value: String },
    SettingsShow,
    ProductList,
    ProductAdd(NewProduct),
    Quote {
        request: QuoteRequest,
        reseller_id: Option<String>,
    },
    OrderPlace {
        reseller_id: String,
        lines: Vec<OrderLineRequest>,
    },
    OrderStatus { order_id: String, status: OrderStatus },
    OrderList { reseller_id: String },
    Invoice { order_id: String },
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, ApiError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ApiError::validation(format!("missing <{}>\n\n{}", name, USAGE)))
}

fn weight(text: &str) -> WeightInput {
    WeightInput::Total {
        weight_kg: parse_weight(text),
    }
}

/// Parses the arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Command, ApiError> {
    let words: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match words.as_slice() {
        [] | ["--help"] | ["-h"] | ["help"] => Command::Help,
        ["migrate"] => Command::Migrate,
        ["seed"] => Command::Seed,
        ["rate", "set", rate] => Command::RateSet(rate.to_string()),
        ["rate", "show"] => Command::RateShow,
        ["settings", "set", key, value] => Command::SettingsSet {
            key: key.to_string(),
            value: value.to_string(),
        },
        ["settings", "show"] => Command::SettingsShow,
        ["product", "list"] => Command::ProductList,
        ["product", "add", ..] => parse_product(&args[2..])?,
        ["quote", ..] => parse_quote(&args[1..])?,
        ["order", "place", reseller_id, lines @ ..] => {
            let lines = lines
                .iter()
                .map(|line| parse_order_line(line))
                .collect::<Result<Vec<_>, _>>()?;
            Command::OrderPlace {
                reseller_id: reseller_id.to_string(),
                lines,
            }
        }
        ["order", "status", order_id, status] => Command::OrderStatus {
            order_id: order_id.to_string(),
            status: status.parse::<OrderStatus>().map_err(CoreError::from)?,
        },
        ["order", "list", reseller_id] => Command::OrderList {
            reseller_id: reseller_id.to_string(),
        },
        ["invoice", order_id] => Command::Invoice {
            order_id: order_id.to_string(),
        },
        _ => {
            return Err(ApiError::validation(format!(
                "unrecognised command: {}\n\n{}",
                args.join(" "),
                USAGE
            )))
        }
    };

    Ok(command)
}

fn parse_quote(args: &[String]) -> Result<Command, ApiError> {
    let product_id = arg(args, 0, "product_id")?.to_string();
    let weight_text = arg(args, 1, "weight_kg")?;

    let mut reseller_id = None;
    let mut rate_override = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--reseller" | "-r" => {
                reseller_id = Some(arg(args, i + 1, "reseller_id")?.to_string());
                i += 1;
            }
            "--rate" => {
                let text = arg(args, i + 1, "rate")?;
                rate_override = Some(parse_decimal("rate_override", text).map_err(CoreError::from)?);
                i += 1;
            }
            other => {
                return Err(ApiError::validation(format!("unknown option: {}", other)));
            }
        }
        i += 1;
    }

    Ok(Command::Quote {
        request: QuoteRequest {
            product_id,
            weight: weight(weight_text),
            rate_override,
        },
        reseller_id,
    })
}

fn parse_product(args: &[String]) -> Result<Command, ApiError> {
    let id = arg(args, 0, "id")?.to_string();
    let name = arg(args, 1, "name")?.to_string();
    let tunch_percentage =
        parse_decimal("tunch_percentage", arg(args, 2, "tunch_pct")?).map_err(CoreError::from)?;
    let labor_per_kg =
        parse_decimal("labor_per_kg", arg(args, 3, "labor_per_kg")?).map_err(CoreError::from)?;

    let hsn_code = match args.get(4).map(String::as_str) {
        Some("--hsn") => Some(arg(args, 5, "hsn_code")?.to_string()),
        Some(other) => return Err(ApiError::validation(format!("unknown option: {}", other))),
        None => None,
    };

    Ok(Command::ProductAdd(NewProduct {
        id: Some(id),
        name,
        hsn_code,
        tunch_percentage,
        labor_per_kg,
    }))
}

fn parse_order_line(text: &str) -> Result<OrderLineRequest, ApiError> {
    match text.rsplit_once(':') {
        Some((product_id, weight_text)) if !product_id.is_empty() => Ok(OrderLineRequest {
            product_id: product_id.to_string(),
            weight: weight(weight_text),
        }),
        _ => Err(ApiError::validation(format!(
            "order line '{}' must be <product_id>:<weight_kg>",
            text
        ))),
    }
}

/// Runs one command against `state`, returning its JSON result.
pub async fn execute(state: &AppState, command: Command) -> Result<Value, ApiError> {
    let now = Utc::now();
    let db = &state.db;
    let terms = &state.terms;

    let output = match command {
        Command::Help => Value::String(USAGE.to_string()),
        Command::Migrate => {
            let (total, applied) = migration_status(db.inner().pool()).await?;
            json!({ "applied": applied, "total": total })
        }
        Command::Seed => to_json(&seed_demo(db.inner(), now).await?)?,
        Command::RateSet(text) => to_json(&commands::rates::set_rate(db, &text, now).await?)?,
        Command::RateShow => {
            to_json(&commands::rates::rate_overview(db, &state.config, now).await?)?
        }
        Command::SettingsSet { key, value } => {
            to_json(&commands::settings::set_setting(db, terms, &key, &value).await?)?
        }
        Command::SettingsShow => to_json(&commands::settings::show_settings(terms).await?)?,
        Command::ProductList => to_json(&commands::product::list_products(db, None).await?)?,
        Command::ProductAdd(input) => {
            to_json(&commands::product::add_product(db, input, now).await?)?
        }
        Command::Quote {
            request,
            reseller_id: Some(reseller_id),
        } => to_json(
            &commands::quote::quote_for_reseller(db, terms, &reseller_id, &request, now).await?,
        )?,
        Command::Quote {
            request,
            reseller_id: None,
        } => to_json(&commands::quote::preview_price(db, terms, &request, now).await?)?,
        Command::OrderPlace { reseller_id, lines } => to_json(
            &commands::order::place_order(db, terms, &state.config, &reseller_id, &lines, now)
                .await?,
        )?,
        Command::OrderStatus { order_id, status } => {
            to_json(&commands::order::update_order_status(db, &order_id, status).await?)?
        }
        Command::OrderList { reseller_id } => {
            to_json(&commands::order::list_orders(db, &reseller_id, None).await?)?
        }
        Command::Invoice { order_id } => {
            to_json(&commands::invoice::render_invoice(db, &order_id).await?)?
        }
    };

    Ok(output)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Parses `args`, opens the configured database and runs the command.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Command Startup                                   │
/// │                                                                         │
/// │  1. Parse arguments ──────────────────────────────────────────────────► │
/// │     • --help returns before touching config or the database             │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults, silverline.toml, SILVERLINE_* env                       │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Build State ──────────────────────────────────────────────────────► │
/// │     • Terms source chosen once (tiered or direct)                       │
/// │                                                                         │
/// │  5. Execute Command ──────────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: &[String]) -> Result<Value, ApiError> {
    let command = parse_args(args)?;
    if command == Command::Help {
        return Ok(Value::String(USAGE.to_string()));
    }

    let config = AppConfig::load()?;
    let state = AppState::open(config).await?;
    info!(command = ?command, "Running command");

    let result = execute(&state, command).await;
    state.db.inner().close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=silverline=trace` - Show trace for silverline crates only
/// - Default: INFO, DEBUG for silverline crates
///
/// Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,silverline=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded_state;
    use rust_decimal_macros::dec;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_quote_with_options() {
        let command = parse_args(&args("quote payal-925 0.25 --reseller pune-chandi --rate 90")).unwrap();
        assert_eq!(
            command,
            Command::Quote {
                request: QuoteRequest {
                    product_id: "payal-925".to_string(),
                    weight: WeightInput::Total { weight_kg: dec!(0.25) },
                    rate_override: Some(dec!(90)),
                },
                reseller_id: Some("pune-chandi".to_string()),
            }
        );

        // Garbage weight is treated as zero, not an error
        let command = parse_args(&args("quote kada-70 abc")).unwrap();
        assert!(matches!(
            command,
            Command::Quote { request, reseller_id: None } if request.weight.weight_kg().is_zero()
        ));
    }

    #[test]
    fn test_parse_order_commands() {
        let command = parse_args(&args("order place pune-chandi kada-70:1 coin-999:0.05")).unwrap();
        match command {
            Command::OrderPlace { reseller_id, lines } => {
                assert_eq!(reseller_id, "pune-chandi");
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[1].product_id, "coin-999");
                assert_eq!(lines[1].weight.weight_kg(), dec!(0.05));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            parse_args(&args("order status o-1 confirmed")).unwrap(),
            Command::OrderStatus {
                order_id: "o-1".to_string(),
                status: OrderStatus::Confirmed,
            }
        );

        assert!(parse_args(&args("order place pune-chandi kada-70")).is_err());
        assert!(matches!(
            parse_args(&args("product add anklet-80 Anklet 80 4200 --hsn 7113")).unwrap(),
            Command::ProductAdd(p) if p.hsn_code.as_deref() == Some("7113")
        ));
        assert!(parse_args(&args("product add anklet-80 Anklet eighty 4200")).is_err());
        assert!(parse_args(&args("order status o-1 shipped")).is_err());
        assert!(parse_args(&args("refund o-1")).is_err());
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    }

    #[tokio::test]
    async fn test_execute_place_then_invoice() {
        let (state, _) = seeded_state().await;

        let placed = execute(
            &state,
            parse_args(&args("order place surat-silver kada-70:0.5")).unwrap(),
        )
        .await
        .unwrap();
        let order_id = placed["order"]["id"].as_str().unwrap().to_string();

        let invoice = execute(&state, Command::Invoice { order_id }).await.unwrap();
        assert_eq!(invoice["summary"]["lines"].as_array().unwrap().len(), 1);
        assert_eq!(invoice["order"]["is_same_state"], Value::Bool(false));
        assert_eq!(invoice["summary"]["line_total_sum"], placed["order"]["total"]);
    }
}
