//! VMware Cloud on AWS usage API integration.
//!
//! This module provides:
//! - Authenticated reads of the deployment-usage and subscription collections
//! - Flat, display-ready records, including bundle expansion for
//!   multi-product subscriptions

pub mod client;
pub mod models;

pub use client::VmcClient;
pub use models::{DeploymentRow, DeploymentUsage, Subscription, SubscriptionRow};
