//! Financial reports.
//!
//! [`ReportService`] builds statements from balance rows without touching
//! storage; [`ReportViews`] fetches the rows for a tenant and applies the
//! permission gate.
//!
//! - Trial balance
//! - Income statement
//! - Balance sheet
//! - Financial ratios and period comparison

pub mod ratios;
pub mod service;
pub mod types;
pub mod views;

#[cfg(test)]
mod report_props;

pub use ratios::{compare_metric, compare_periods, financial_ratios};
pub use service::{COST_OF_SALES_PREFIX, ReportService};
pub use types::*;
pub use views::{DEFAULT_CURRENCY, Period, ReportViews};
