//! # Seed Data Generator
//!
//! Populates a development database with a clothing catalog and a few clients.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p estilo-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p estilo-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p estilo-db --bin seed -- --db ./data/estilo.db
//! ```
//!
//! ## Generated Products
//! One product per (section, garment, size) until `--count` is reached:
//! - Barcode: `789{SEED:010}` (EAN-13 shaped, checksum not valid)
//! - Price: R$ 29.90 - R$ 249.90 plus a size addon
//! - Stock: 0 - 40

use std::env;

use estilo_core::{NewClient, NewProduct};
use estilo_db::{Database, DbConfig};

/// Store sections and the garments sold in each.
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "Feminino",
        &[
            "Vestido floral",
            "Blusa de seda",
            "Saia midi",
            "Calça pantalona",
            "Cardigã de tricô",
            "Macacão de linho",
        ],
    ),
    (
        "Masculino",
        &[
            "Camisa social",
            "Camiseta básica",
            "Calça jeans",
            "Bermuda de sarja",
            "Jaqueta corta-vento",
            "Polo piquet",
        ],
    ),
    (
        "Infantil",
        &[
            "Conjunto moletom",
            "Vestido de festa",
            "Pijama estampado",
            "Jardineira jeans",
        ],
    ),
    (
        "Acessórios",
        &["Bolsa de couro", "Cinto trançado", "Lenço de seda", "Boné aba curva"],
    ),
];

/// Size labels with their price addon in cents.
const SIZES: &[(&str, i64)] = &[("P", 0), ("M", 0), ("G", 500), ("GG", 1000)];

const CLIENTS: &[(&str, &str, &str, &str)] = &[
    ("Maria Souza", "maria@example.com", "12345678901", "5511999990001"),
    ("João Lima", "joao@example.com", "98765432100", "5511999990002"),
    ("Ana Costa", "ana@example.com", "11122233344", "5511999990003"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./data/estilo.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lu Estilo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/estilo.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Lu Estilo Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.products().list(0, 1, None).await?.is_empty() {
        println!("⚠ Database already has products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (section_idx, (section, garments)) in SECTIONS.iter().enumerate() {
        for (garment_idx, garment) in garments.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = section_idx * 1000 + garment_idx * 10 + size_idx;
                let product = generate_product(section, garment, size, *price_addon, seed);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.barcode, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    println!();
    println!("Generating clients...");

    for (name, email, cpf, phone) in CLIENTS {
        let client = NewClient {
            name: name.to_string(),
            email: email.to_string(),
            cpf: cpf.to_string(),
            phone: Some(phone.to_string()),
        };

        match db.clients().insert(&client).await {
            Ok(created) => println!("  {} (id {})", created.name, created.id),
            Err(e) => eprintln!("Failed to insert {}: {}", email, e),
        }
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one catalog entry with deterministic pseudo-random values.
fn generate_product(section: &str, garment: &str, size: &str, price_addon: i64, seed: usize) -> NewProduct {
    let barcode = format!("789{:010}", seed);

    // R$ 29.90 - R$ 249.90, always ending in 90 cents
    let price_cents = 2990 + ((seed * 37) % 23) as i64 * 1000 + price_addon;

    NewProduct {
        description: format!("{} {}", garment, size),
        price_cents,
        barcode,
        section: section.to_string(),
        stock: (seed % 41) as i64,
        available: true,
        expiration_date: None,
        image_url: None,
    }
}
