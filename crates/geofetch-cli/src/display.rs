//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions for
//! presenting dataset schemas and catalog search results in a
//! human-readable format.

use tabled::{Table, Tabled};

use geofetch_catalog::{CatalogItem, SignedItem};
use geofetch_core::types::FieldInfo;

/// Table row representation for displaying field/column information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Data type of the field.
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// Whether the field can contain null values.
    #[tabled(rename = "Nullable")]
    pub nullable: String,
}

/// Table row representation for displaying catalog items.
#[derive(Tabled)]
pub struct ItemRow {
    /// Item identifier.
    #[tabled(rename = "Item")]
    pub id: String,
    /// Acquisition datetime, if the item carries one.
    #[tabled(rename = "Datetime")]
    pub datetime: String,
    /// Item bounding box.
    #[tabled(rename = "BBox")]
    pub bbox: String,
    /// Asset keys available on the item.
    #[tabled(rename = "Assets")]
    pub assets: String,
}

/// Display a dataset schema as a formatted table.
pub fn display_fields(fields: &[FieldInfo]) {
    let rows: Vec<FieldRow> = fields
        .iter()
        .map(|f| FieldRow {
            name: f.name.clone(),
            data_type: f.data_type.clone(),
            nullable: if f.nullable { "Yes" } else { "No" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
}

/// Display catalog search results as a formatted table.
pub fn display_items(items: &[CatalogItem]) {
    println!("\nMatched {} item(s):\n", items.len());

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|item| ItemRow {
            id: item.id.clone(),
            datetime: item.datetime().unwrap_or("N/A").to_string(),
            bbox: item
                .bbox
                .as_ref()
                .map(|b| {
                    b.iter()
                        .map(|v| format!("{v:.2}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_else(|| "N/A".to_string()),
            assets: item.assets.keys().cloned().collect::<Vec<_>>().join(", "),
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
}

/// Display the signed asset locators of an item.
pub fn display_signed_item(signed: &SignedItem) {
    println!(
        "\nSigned assets for '{}' (expires {}):",
        signed.item().id,
        signed.expires_at()
    );
    for (key, asset) in &signed.item().assets {
        println!("  {key}: {}", asset.href);
    }
}
