//! # Seed Data Generator
//!
//! Populates a database with demo catalog, resellers, settings and rates.
//!
//! ## Usage
//! ```bash
//! # Seed ./silverline_dev.db
//! cargo run -p silverline-db --bin seed
//!
//! # Specify database path
//! cargo run -p silverline-db --bin seed -- --db ./data/silverline.db
//! ```

use chrono::Utc;
use silverline_db::seed::seed_demo;
use silverline_db::{Database, DbConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./silverline_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Silverline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./silverline_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Silverline Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let summary = seed_demo(&db, Utc::now()).await?;
    if summary.skipped {
        println!("⚠ Database already has products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!("✓ {} products", summary.products);
    println!("✓ {} resellers with terms", summary.resellers);
    println!("✓ {} rate samples", summary.rate_samples);

    let rate = db.rates().current_rate().await?;
    println!();
    println!("Current rate: ₹{}/g", rate);
    println!("✓ Seed complete!");

    Ok(())
}
