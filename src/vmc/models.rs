//! Data models for VMware Cloud on AWS usage reporting.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Product identifier for vSphere usage entries.
pub const PRODUCT_VSPHERE: &str = "VMware vSphere";

/// Product identifier for vSAN usage entries.
pub const PRODUCT_VSAN: &str = "VMware vSAN";

/// Per-deployment usage as returned by the usage API.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentUsage {
    pub deployment_id: String,
    pub deployment_name: String,

    /// One entry per consumed product.
    #[serde(default)]
    pub usages: Vec<ProductUsage>,
}

/// A single product consumption entry within a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUsage {
    pub product: String,
    pub quantity: f64,
    /// Unit the quantity is measured in. Not shown in the report.
    #[serde(default)]
    #[allow(dead_code)]
    pub unit: String,
}

impl DeploymentUsage {
    /// A deployment matches when the filter equals its id or is a
    /// case-insensitive substring of its name.
    pub fn matches(&self, filter: &str) -> bool {
        self.deployment_id == filter
            || self
                .deployment_name
                .to_lowercase()
                .contains(&filter.to_lowercase())
    }
}

/// Flat, display-ready deployment record.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRow {
    pub id: String,
    pub name: String,
    pub vsphere_usage: f64,
    pub vsan_usage: f64,
}

impl DeploymentRow {
    /// Derive the row by scanning the per-product usage entries for the two
    /// known product identifiers. Duplicate entries sum; a missing product
    /// reports zero.
    pub fn from_usage(usage: &DeploymentUsage) -> Self {
        let mut vsphere_usage = 0.0;
        let mut vsan_usage = 0.0;

        for entry in &usage.usages {
            match entry.product.as_str() {
                PRODUCT_VSPHERE => vsphere_usage += entry.quantity,
                PRODUCT_VSAN => vsan_usage += entry.quantity,
                _ => {}
            }
        }

        Self {
            id: usage.deployment_id.clone(),
            name: usage.deployment_name.clone(),
            vsphere_usage,
            vsan_usage,
        }
    }
}

/// A subscription as returned by the subscription API.
///
/// Bundled multi-product subscriptions carry their contained products in the
/// `context` bag, one `"<count> <units>"` string per product.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub units: String,
    pub product_type: String,
    #[serde(default)]
    pub flexibility: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub billing_options: String,
    #[serde(default)]
    pub commitment_term: String,
    #[serde(default)]
    pub commitment_term_uom: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl Subscription {
    /// Bundled subscriptions list their contained products in the context bag.
    pub fn is_bundle(&self) -> bool {
        !self.context.is_empty()
    }

    /// A subscription matches when the filter equals its id.
    pub fn matches(&self, filter: &str) -> bool {
        self.id == filter
    }

    /// Flatten into display rows.
    ///
    /// Simple case: one row from the top-level fields. Bundled case (expansion
    /// enabled, non-empty context bag): one row per contained product, with the
    /// bag key as the product type and the bag value split into count and units.
    pub fn rows(&self, expand_bundles: bool) -> Vec<SubscriptionRow> {
        if expand_bundles && self.is_bundle() {
            self.context
                .iter()
                .map(|(product, value)| {
                    let (quantity, units) = split_count_and_units(value);
                    SubscriptionRow {
                        quantity,
                        units,
                        product_type: product.clone(),
                        ..self.base_row()
                    }
                })
                .collect()
        } else {
            vec![self.base_row()]
        }
    }

    fn base_row(&self) -> SubscriptionRow {
        SubscriptionRow {
            id: self.id.clone(),
            status: self.status.clone(),
            quantity: format_quantity(self.quantity),
            units: self.units.clone(),
            product_type: self.product_type.clone(),
            flexibility: self.flexibility.clone(),
            seller: self.seller.clone(),
            billing_options: self.billing_options.clone(),
            term: format!("{} {}", self.commitment_term, self.commitment_term_uom)
                .trim()
                .to_string(),
            region: self.region.clone(),
            start_date: format_date(self.start_date),
            end_date: format_date(self.end_date),
        }
    }
}

/// Flat, display-ready subscription record, one per line item.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRow {
    pub id: String,
    pub status: String,
    pub quantity: String,
    pub units: String,
    pub product_type: String,
    pub flexibility: String,
    pub seller: String,
    pub billing_options: String,
    pub term: String,
    pub region: String,
    pub start_date: String,
    pub end_date: String,
}

/// Split a context bag value like `"16 CORES"` into count and units.
///
/// The first whitespace-separated token is the count; the remainder, rejoined,
/// is the units. Either side may come out empty.
fn split_count_and_units(value: &str) -> (String, String) {
    let mut parts = value.split_whitespace();
    let quantity = parts.next().unwrap_or("").to_string();
    let units = parts.collect::<Vec<_>>().join(" ");
    (quantity, units)
}

/// Render usage quantities without a trailing `.0` for whole numbers.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        (quantity as i64).to_string()
    } else {
        quantity.to_string()
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deployment() -> DeploymentUsage {
        DeploymentUsage {
            deployment_id: "dep-1".to_string(),
            deployment_name: "Production SDDC".to_string(),
            usages: vec![
                ProductUsage {
                    product: PRODUCT_VSPHERE.to_string(),
                    quantity: 12.0,
                    unit: "CORES".to_string(),
                },
                ProductUsage {
                    product: PRODUCT_VSAN.to_string(),
                    quantity: 4.5,
                    unit: "TIB".to_string(),
                },
                ProductUsage {
                    product: "VMware NSX".to_string(),
                    quantity: 99.0,
                    unit: "CORES".to_string(),
                },
            ],
        }
    }

    fn sample_subscription() -> Subscription {
        Subscription {
            id: "sub-1".to_string(),
            status: "ACTIVE".to_string(),
            quantity: 3.0,
            units: "HOSTS".to_string(),
            product_type: "VMware Cloud on AWS".to_string(),
            flexibility: "NON_FLEXIBLE".to_string(),
            seller: "VMWARE".to_string(),
            billing_options: "PREPAID".to_string(),
            commitment_term: "36".to_string(),
            commitment_term_uom: "MONTH".to_string(),
            region: "US_WEST_2".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            end_date: NaiveDate::from_ymd_opt(2028, 1, 15),
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn test_deployment_row_picks_known_products() {
        let row = DeploymentRow::from_usage(&sample_deployment());
        assert_eq!(row.id, "dep-1");
        assert_eq!(row.name, "Production SDDC");
        assert_eq!(row.vsphere_usage, 12.0);
        assert_eq!(row.vsan_usage, 4.5);
    }

    #[test]
    fn test_deployment_row_sums_duplicates_and_defaults_to_zero() {
        let mut deployment = sample_deployment();
        deployment.usages.push(ProductUsage {
            product: PRODUCT_VSPHERE.to_string(),
            quantity: 8.0,
            unit: "CORES".to_string(),
        });
        let row = DeploymentRow::from_usage(&deployment);
        assert_eq!(row.vsphere_usage, 20.0);

        deployment.usages.clear();
        let row = DeploymentRow::from_usage(&deployment);
        assert_eq!(row.vsphere_usage, 0.0);
        assert_eq!(row.vsan_usage, 0.0);
    }

    #[test]
    fn test_deployment_matching() {
        let deployment = sample_deployment();
        assert!(deployment.matches("dep-1"));
        assert!(deployment.matches("production"));
        assert!(deployment.matches("SDDC"));
        assert!(!deployment.matches("dep-2"));
    }

    #[test]
    fn test_simple_subscription_row() {
        let rows = sample_subscription().rows(true);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.id, "sub-1");
        assert_eq!(row.quantity, "3");
        assert_eq!(row.units, "HOSTS");
        assert_eq!(row.term, "36 MONTH");
        assert_eq!(row.start_date, "2025-01-15");
        assert_eq!(row.end_date, "2028-01-15");
    }

    #[test]
    fn test_bundle_expansion() {
        let mut subscription = sample_subscription();
        subscription.product_type = "VMware Cloud Universal".to_string();
        subscription.context.insert(
            "VMware vSphere".to_string(),
            "16 CORES".to_string(),
        );
        subscription
            .context
            .insert("VMware vSAN".to_string(), "8 vSAN TiB".to_string());

        let rows = subscription.rows(true);
        assert_eq!(rows.len(), 2);

        // BTreeMap iteration keeps the bag keys sorted
        assert_eq!(rows[0].product_type, "VMware vSAN");
        assert_eq!(rows[0].quantity, "8");
        assert_eq!(rows[0].units, "vSAN TiB");
        assert_eq!(rows[1].product_type, "VMware vSphere");
        assert_eq!(rows[1].quantity, "16");
        assert_eq!(rows[1].units, "CORES");

        // Remaining columns come from the parent subscription
        assert_eq!(rows[0].id, "sub-1");
        assert_eq!(rows[0].status, "ACTIVE");
        assert_eq!(rows[0].term, "36 MONTH");
        assert_eq!(rows[0].region, "US_WEST_2");
    }

    #[test]
    fn test_bundle_not_expanded_without_flag() {
        let mut subscription = sample_subscription();
        subscription
            .context
            .insert("VMware vSphere".to_string(), "16 CORES".to_string());

        let rows = subscription.rows(false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_type, "VMware Cloud on AWS");
        assert_eq!(rows[0].quantity, "3");
    }

    #[test]
    fn test_split_count_and_units() {
        assert_eq!(
            split_count_and_units("16 CORES"),
            ("16".to_string(), "CORES".to_string())
        );
        assert_eq!(
            split_count_and_units("8 vSAN TiB"),
            ("8".to_string(), "vSAN TiB".to_string())
        );
        assert_eq!(split_count_and_units("16"), ("16".to_string(), String::new()));
        assert_eq!(split_count_and_units("   "), (String::new(), String::new()));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(4.5), "4.5");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn test_subscription_deserialization() {
        let json = r#"{
            "id": "sub-9",
            "status": "ACTIVE",
            "quantity": 2,
            "units": "HOSTS",
            "product_type": "VMware Cloud Universal",
            "flexibility": "FLEXIBLE",
            "seller": "AWS",
            "billing_options": "ON_DEMAND",
            "commitment_term": "12",
            "commitment_term_uom": "MONTH",
            "region": "EU_CENTRAL_1",
            "start_date": "2025-06-01",
            "end_date": "2026-06-01",
            "context": {"VMware vSphere": "32 CORES"}
        }"#;

        let subscription: Subscription = serde_json::from_str(json).unwrap();
        assert!(subscription.is_bundle());
        assert!(subscription.matches("sub-9"));
        assert_eq!(subscription.quantity, 2.0);
        assert_eq!(
            subscription.start_date,
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn test_subscription_deserialization_minimal() {
        // Fields the service omits fall back to empty defaults
        let json = r#"{"id": "sub-10", "status": "EXPIRED", "product_type": "VMware Cloud on AWS"}"#;
        let subscription: Subscription = serde_json::from_str(json).unwrap();
        assert!(!subscription.is_bundle());

        let rows = subscription.rows(true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, "0");
        assert_eq!(rows[0].term, "");
        assert_eq!(rows[0].start_date, "");
    }
}
