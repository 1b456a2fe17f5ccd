//! # Seed Data Generator
//!
//! Populates the database with a demo group order for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./grouporder_dev.db
//! cargo run -p grouporder-db --bin seed
//!
//! # Specify database path
//! cargo run -p grouporder-db --bin seed -- --db ./data/grouporder.db
//! ```
//!
//! ## Generated Data
//! - Three profiles (one PIC, two participants)
//! - One OPEN order with a small menu, a 10% discount capped at 20.00
//!   and a 15.00 delivery fee
//! - A handful of line items, including a merged duplicate
//!
//! The computed summary is logged as JSON at the end.

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use grouporder_core::{
    compute_summary, DiscountRate, MenuItem, Money, NewOrder, PricingRules, ProposedLineItem,
};
use grouporder_db::{Database, DbConfig};

/// (user id, display name)
const PROFILES: &[(&str, &str)] = &[
    ("user-pic", "Sri Wahyuni"),
    ("user-budi", "Budi Santoso"),
    ("user-ayu", "Ayu Lestari"),
];

/// (name, price in minor units)
const MENU: &[(&str, i64)] = &[
    ("Nasi Goreng Spesial", 3500000),
    ("Mie Ayam", 2500000),
    ("Sate Ayam (10 tusuk)", 3000000),
    ("Es Teh Manis", 500000),
    ("Es Jeruk", 800000),
];

/// (user id, menu item, quantity)
const LINE_ITEMS: &[(&str, &str, i64)] = &[
    ("user-pic", "Mie Ayam", 1),
    ("user-budi", "Nasi Goreng Spesial", 2),
    ("user-budi", "Es Teh Manis", 1),
    ("user-ayu", "Sate Ayam (10 tusuk)", 1),
    ("user-ayu", "Es Jeruk", 1),
    // Merges into the row above
    ("user-budi", "Es Teh Manis", 1),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./grouporder_dev.db");

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
                println!("Group Order Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./grouporder_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    for (user_id, full_name) in PROFILES {
        db.profiles().upsert(user_id, full_name).await?;
    }
    info!(count = PROFILES.len(), "Profiles seeded");

    let draft = NewOrder {
        title: "Makan siang Jumat".to_string(),
        store_name: "Warung Bu Sri".to_string(),
        deadline: Utc::now() + Duration::hours(3),
        menu: MENU
            .iter()
            .map(|(name, price)| MenuItem::new(*name, Money::from_minor(*price)))
            .collect(),
        pricing: PricingRules {
            service_and_delivery_fee: Money::from_minor(1500000),
            discount_rate: DiscountRate::from_percentage(10.0),
            max_discount: Some(Money::from_minor(2000000)),
            min_order_for_discount: Money::from_minor(5000000),
        },
    };

    let order = db.orders().create(PROFILES[0].0, &draft).await?;
    info!(order_id = %order.id, "Order created");

    for (user_id, item_name, quantity) in LINE_ITEMS {
        let Some(menu_item) = order.menu_item(item_name) else {
            warn!(item_name = %item_name, "Not on the menu, skipping");
            continue;
        };

        let proposal = ProposedLineItem {
            user_id: user_id.to_string(),
            user_name: None,
            item_name: menu_item.name.clone(),
            item_price: menu_item.price,
            quantity: *quantity,
        };
        db.line_items().add_or_merge(&order.id, &proposal).await?;
    }

    let Some(order) = db.orders().get_by_id(&order.id).await? else {
        return Err(format!("order {} vanished after seeding", order.id).into());
    };

    let summary = compute_summary(&order);
    info!(
        line_items = order.line_items.len(),
        participants = order.participant_count(),
        grand_total = %summary.grand_total,
        "Seed complete"
    );
    info!("Summary:\n{}", serde_json::to_string_pretty(&summary)?);

    db.close().await;
    Ok(())
}
