use std::sync::Arc;

use shared::ads_client::ReportApi;
use shared::dto::{Predicate, ReportDefinition};
use shared::error::RemoteCallError;
use thiserror::Error;
use tracing::{debug, info};

use crate::report_rows::{self, MalformedReport, ReportRow};

pub const REPORT_NAME: &str = "Custom Adgroup Performance Report";
pub const REPORT_TYPE: &str = "CAMPAIGN_PERFORMANCE_REPORT";
pub const REPORT_FIELDS: [&str; 5] = [
    "CampaignId",
    "Impressions",
    "Clicks",
    "Cost",
    "CampaignStatus",
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Remote(#[from] RemoteCallError),
    #[error(transparent)]
    Malformed(#[from] MalformedReport),
}

/// All-time performance of a single campaign, as CSV.
pub fn campaign_performance_report(campaign_id: i64) -> ReportDefinition {
    ReportDefinition {
        report_name: REPORT_NAME.into(),
        report_type: REPORT_TYPE.into(),
        fields: REPORT_FIELDS.iter().map(|f| f.to_string()).collect(),
        filters: vec![Predicate::equals("CampaignId", campaign_id)],
        date_range_type: "ALL_TIME".into(),
        format: "CSV".into(),
    }
}

pub struct CampaignReports {
    api: Arc<dyn ReportApi>,
    version: String,
}

impl CampaignReports {
    pub fn new(api: Arc<dyn ReportApi>, version: impl Into<String>) -> Self {
        Self {
            api,
            version: version.into(),
        }
    }

    /// Downloads the campaign's report and returns its first data row as
    /// label/value pairs.
    pub async fn rows(&self, campaign_id: i64) -> Result<Vec<ReportRow>, ReportError> {
        let definition = campaign_performance_report(campaign_id);
        let raw = self.api.get_report(&self.version, &definition).await?;
        debug!(campaign_id, bytes = raw.len(), "report downloaded");
        let rows: Vec<ReportRow> = report_rows::parse(&raw)?.collect();
        info!(campaign_id, columns = rows.len(), "report parsed");
        Ok(rows)
    }
}
