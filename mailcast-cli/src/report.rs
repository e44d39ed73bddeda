//! Result reporting
//!
//! Renders the live delivery log, the derived job summary, and the
//! directory/preview tables on stdout; diagnostics go to the tracing
//! subscriber on stderr. Also writes the CSV export of a finished (or
//! abandoned) log.

use std::path::Path;

use mailcast_common::api::{ClientRecord, ProductInfo, TemplateInfo};
use mailcast_common::csv::delivery_log_csv;
use mailcast_common::{DeliveryEvent, DeliveryStatus};

use crate::job::JobProgressSummary;

/// Print one delivery event as a log line
pub fn print_event(event: &DeliveryEvent) {
    match event.status {
        DeliveryStatus::Sending => {
            println!("  Sending to {} ({})...", event.name, event.email);
        }
        DeliveryStatus::Sent => {
            println!("✓ Sent to {} ({})", event.name, event.email);
        }
        DeliveryStatus::Failed => {
            let reason = event.reason.as_deref().unwrap_or("unknown reason");
            println!("✗ Failed to send to {} ({}): {}", event.name, event.email, reason);
        }
    }
}

/// Print the derived job summary
pub fn print_summary(summary: &JobProgressSummary, foreign_events: u64) {
    println!();
    println!("Total:  {}", summary.total);
    println!("Sent:   {}", summary.sent);
    println!("Failed: {}", summary.failed);
    if !summary.is_complete {
        println!("(incomplete: some recipients are still in flight)");
    }
    if foreign_events > 0 {
        println!("({} events from other jobs ignored)", foreign_events);
    }
}

/// Print the audience preview table
pub fn print_clients(clients: &[ClientRecord]) {
    if clients.is_empty() {
        println!("No matching clients found.");
        return;
    }

    println!(
        "{:<6} {:<24} {:<30} {:<8} {:<12} {:<6} Products",
        "ID", "Name", "Email", "Gender", "DOB", "Head"
    );
    for client in clients {
        println!(
            "{:<6} {:<24} {:<30} {:<8} {:<12} {:<6} {}",
            client.client_id,
            client.client_name,
            client.client_email,
            client.client_gender.as_deref().unwrap_or("-"),
            client.client_dob.as_deref().unwrap_or("-"),
            if client.family_head { "yes" } else { "no" },
            client.client_products.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} matching clients", clients.len());
}

/// Print the template directory
pub fn print_templates(templates: &[TemplateInfo]) {
    if templates.is_empty() {
        println!("No templates defined.");
        return;
    }
    println!("{:<6} Name", "ID");
    for template in templates {
        println!("{:<6} {}", template.template_id, template.template_name);
    }
}

/// Print the product directory
pub fn print_products(products: &[ProductInfo]) {
    if products.is_empty() {
        println!("No products defined.");
        return;
    }
    println!("{:<6} Name", "ID");
    for product in products {
        println!("{:<6} {}", product.product_id, product.product_name);
    }
}

/// Write the delivery log as CSV to the given path
pub fn export_csv(events: &[DeliveryEvent], path: &Path) -> std::io::Result<()> {
    std::fs::write(path, delivery_log_csv(events))?;
    tracing::info!(path = %path.display(), rows = events.len(), "Delivery log exported");
    Ok(())
}
