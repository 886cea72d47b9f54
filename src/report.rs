//! Deployment-usage and subscription reports.
//!
//! Each reporter fetches its collection, applies the optional filter, reshapes
//! the records into flat rows, and prints a table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use crate::connection::get_connection;
use crate::error::AppError;
use crate::vmc::models::{
    format_quantity, DeploymentRow, DeploymentUsage, Subscription, SubscriptionRow,
};
use crate::vmc::VmcClient;

/// Report per-deployment vSphere and vSAN usage, plus aggregate totals.
pub async fn deployment_report(client: &VmcClient, filter: Option<&str>) -> Result<(), AppError> {
    let connection = get_connection()?;
    let deployments = client.get_deployment_usage(&connection).await?;
    let rows = deployment_rows(&deployments, filter);

    println!("{}", render_deployment_table(&rows));

    let (total_vsphere, total_vsan) = usage_totals(&rows);
    println!("Total vSphere usage: {}", format_quantity(total_vsphere));
    println!("Total vSAN usage:    {}", format_quantity(total_vsan));

    Ok(())
}

/// Report subscription line items, optionally expanding bundles into one row
/// per contained product.
pub async fn subscription_report(
    client: &VmcClient,
    filter: Option<&str>,
    expand_bundles: bool,
) -> Result<(), AppError> {
    let connection = get_connection()?;
    let subscriptions = client.get_subscriptions(&connection).await?;
    let rows = subscription_rows(&subscriptions, filter, expand_bundles);

    println!("{}", render_subscription_table(&rows));

    Ok(())
}

fn deployment_rows(deployments: &[DeploymentUsage], filter: Option<&str>) -> Vec<DeploymentRow> {
    deployments
        .iter()
        .filter(|deployment| match filter {
            Some(f) => deployment.matches(f),
            None => true,
        })
        .map(DeploymentRow::from_usage)
        .collect()
}

fn subscription_rows(
    subscriptions: &[Subscription],
    filter: Option<&str>,
    expand_bundles: bool,
) -> Vec<SubscriptionRow> {
    subscriptions
        .iter()
        .filter(|subscription| match filter {
            Some(f) => subscription.matches(f),
            None => true,
        })
        .flat_map(|subscription| subscription.rows(expand_bundles))
        .collect()
}

fn usage_totals(rows: &[DeploymentRow]) -> (f64, f64) {
    rows.iter().fold((0.0, 0.0), |(vsphere, vsan), row| {
        (vsphere + row.vsphere_usage, vsan + row.vsan_usage)
    })
}

fn render_deployment_table(rows: &[DeploymentRow]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Id", "Name", "vSphere Usage", "vSAN Usage"]);

    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.name.clone(),
            format_quantity(row.vsphere_usage),
            format_quantity(row.vsan_usage),
        ]);
    }

    table
}

fn render_subscription_table(rows: &[SubscriptionRow]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Id",
        "Status",
        "Quantity",
        "Units",
        "Type",
        "Flexibility",
        "Seller",
        "Billing",
        "Term",
        "Region",
        "Start Date",
        "End Date",
    ]);

    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.status.clone(),
            row.quantity.clone(),
            row.units.clone(),
            row.product_type.clone(),
            row.flexibility.clone(),
            row.seller.clone(),
            row.billing_options.clone(),
            row.term.clone(),
            row.region.clone(),
            row.start_date.clone(),
            row.end_date.clone(),
        ]);
    }

    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}
