//! # Seed Data Generator
//!
//! Populates a development database with the standard roster and a starter
//! catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p caixa-db --bin seed
//! cargo run -p caixa-db --bin seed -- --db ./data/loja.db
//! ```

use chrono::Utc;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use caixa_core::{Product, Role};
use caixa_db::repository::operator::new_operator;
use caixa_db::{Database, DbConfig};

/// Starter catalog: (barcode, name, description, price, cost, category,
/// stock, min_stock), prices in centavos.
const PRODUCTS: &[(&str, &str, &str, i64, i64, &str, i64, i64)] = &[
    (
        "7891000315507",
        "Arroz Integral 1kg",
        "Arroz integral tipo 1",
        650,
        420,
        "Alimentos",
        50,
        10,
    ),
    (
        "7891000053508",
        "Feijão Carioca 1kg",
        "Feijão carioca tipo 1",
        890,
        580,
        "Alimentos",
        30,
        15,
    ),
    (
        "7891910000197",
        "Café em Pó 500g",
        "Café torrado e moído",
        1290,
        850,
        "Alimentos",
        20,
        5,
    ),
    (
        "7898927019217",
        "Salgadinho Doritos 28g",
        "Salgadinho de milho",
        450,
        250,
        "Salgadinhos",
        100,
        20,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut db_path = String::from("./loja_dev.db");

    let args: Vec<String> = env::args().collect();
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
                println!("Caixa POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./loja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, "seeding development database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.catalog().count_active().await?;
    if existing > 0 {
        info!(products = existing, "database already seeded, skipping");
        return Ok(());
    }

    // The standard two-person roster
    let admin = new_operator("Administrador", "admin@loja.com", Role::Admin);
    let cashier = new_operator("Operador Caixa", "caixa@loja.com", Role::Cashier);
    db.operators().insert(&admin).await?;
    db.operators().insert(&cashier).await?;
    info!("operators created: admin@loja.com, caixa@loja.com");

    let now = Utc::now();
    for (barcode, name, description, price, cost, category, stock, min_stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: barcode.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            price_cents: *price,
            cost_cents: *cost,
            category: Some(category.to_string()),
            stock: *stock,
            min_stock: *min_stock,
            image_path: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.catalog().insert(&product).await?;
    }
    info!(products = PRODUCTS.len(), "catalog seeded");

    // smoke-check the search path
    let hits = db.catalog().search("arroz").await?;
    info!(hits = hits.len(), "search 'arroz' verified");

    info!("seed complete");
    Ok(())
}
