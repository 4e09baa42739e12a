//! Lifecycle actions on existing campaigns: list, pause and retire.
//!
//! Pause and retire first look the campaign up by id. A campaign missing
//! from the query result is reported as [`PauseOutcome::NotFound`] /
//! [`RetireOutcome::NotFound`] and no mutate is sent.

use std::sync::Arc;

use serde::Serialize;
use shared::ads_client::AdsApi;
use shared::dto::{
    AdsService, Budget, Campaign, CampaignEntry, OrderBy, Operand, Operation, Page, Predicate,
    Selector, SortOrder, Status,
};
use shared::error::RemoteCallError;
use tracing::{info, warn};

use crate::error::{ProvisionError, Result};
use crate::orchestrator::Stage;

#[derive(Debug, Clone, Serialize)]
pub struct CampaignList {
    pub campaigns: Vec<CampaignEntry>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    Paused,
    NotFound,
}

/// Result of a retire request. Both removals are attempted independently,
/// so each carries its own result.
#[derive(Debug)]
pub enum RetireOutcome {
    NotFound,
    Attempted {
        status_removal: Result<()>,
        budget_removal: Result<()>,
    },
}

impl RetireOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            RetireOutcome::Attempted {
                status_removal: Ok(()),
                budget_removal: Ok(()),
            }
        )
    }
}

pub struct CampaignLifecycle {
    api: Arc<dyn AdsApi>,
}

impl CampaignLifecycle {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self { api }
    }

    pub fn list_selector() -> Selector {
        Selector {
            fields: vec!["Id".into(), "Name".into(), "Status".into()],
            ordering: vec![OrderBy {
                field: "Name".into(),
                sort_order: SortOrder::Ascending,
            }],
            ..Selector::default()
        }
    }

    pub fn lookup_selector(campaign_id: i64) -> Selector {
        Selector {
            fields: vec!["BudgetId".into(), "BudgetStatus".into()],
            predicates: vec![Predicate::equals("Id", campaign_id)],
            ..Selector::default()
        }
    }

    pub fn status_operation(campaign_id: i64, status: Status) -> Operation {
        Operation::set(Operand::Campaign(Campaign {
            id: Some(campaign_id),
            status: Some(status),
            ..Campaign::default()
        }))
    }

    pub fn budget_removal(budget_id: i64) -> Operation {
        Operation::remove(Operand::Budget(Budget {
            budget_id: Some(budget_id),
            ..Budget::default()
        }))
    }

    /// First page of campaigns ordered by name.
    pub async fn list(&self) -> Result<CampaignList> {
        let page = self
            .api
            .get(AdsService::CampaignService, &Self::list_selector())
            .await?;
        let campaigns = page
            .entries
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<CampaignEntry>, _>>()
            .map_err(RemoteCallError::from)?;
        Ok(CampaignList {
            campaigns,
            total: page.total_num_entries,
        })
    }

    pub async fn pause(&self, campaign_id: i64) -> Result<PauseOutcome> {
        if self.lookup(campaign_id).await?.is_none() {
            info!(campaign_id, "pause: campaign not found");
            return Ok(PauseOutcome::NotFound);
        }
        self.api
            .mutate(
                AdsService::CampaignService,
                &[Self::status_operation(campaign_id, Status::Paused)],
            )
            .await?;
        info!(campaign_id, "campaign paused");
        Ok(PauseOutcome::Paused)
    }

    /// Marks the campaign removed, then removes its budget. The budget
    /// removal is sent even when the status change failed.
    pub async fn retire(&self, campaign_id: i64) -> Result<RetireOutcome> {
        let Some(campaign) = self.lookup(campaign_id).await? else {
            info!(campaign_id, "retire: campaign not found");
            return Ok(RetireOutcome::NotFound);
        };

        let status_removal = self
            .api
            .mutate(
                AdsService::CampaignService,
                &[Self::status_operation(campaign_id, Status::Removed)],
            )
            .await
            .map(|_| ())
            .map_err(ProvisionError::from);
        if let Err(e) = &status_removal {
            warn!(campaign_id, error = %e, "status removal failed; removing budget anyway");
        }

        let budget_removal = match campaign.budget.and_then(|b| b.budget_id) {
            Some(budget_id) => self
                .api
                .mutate(AdsService::BudgetService, &[Self::budget_removal(budget_id)])
                .await
                .map(|_| ())
                .map_err(ProvisionError::from),
            None => Err(ProvisionError::MissingReference {
                stage: Stage::Budget,
            }),
        };
        if let Err(e) = &budget_removal {
            warn!(campaign_id, error = %e, "budget removal failed");
        }

        info!(
            campaign_id,
            status_removed = status_removal.is_ok(),
            budget_removed = budget_removal.is_ok(),
            "retire attempted"
        );
        Ok(RetireOutcome::Attempted {
            status_removal,
            budget_removal,
        })
    }

    async fn lookup(&self, campaign_id: i64) -> Result<Option<CampaignEntry>> {
        let page: Page = self
            .api
            .get(
                AdsService::CampaignService,
                &Self::lookup_selector(campaign_id),
            )
            .await?;
        match page.entries.into_iter().next() {
            Some(entry) => Ok(Some(
                serde_json::from_value(entry).map_err(RemoteCallError::from)?,
            )),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_selector_filters_by_id() {
        let v = serde_json::to_value(CampaignLifecycle::lookup_selector(42)).unwrap();
        assert_eq!(v["fields"], serde_json::json!(["BudgetId", "BudgetStatus"]));
        assert_eq!(
            v["predicates"][0],
            serde_json::json!({"field": "Id", "operator": "EQUALS", "values": ["42"]})
        );
        assert_eq!(v["paging"]["numberResults"], 500);
    }

    #[test]
    fn list_selector_orders_by_name() {
        let v = serde_json::to_value(CampaignLifecycle::list_selector()).unwrap();
        assert_eq!(v["ordering"][0]["sortOrder"], "ASCENDING");
        assert!(v.get("predicates").is_none());
    }

    #[test]
    fn status_operation_only_sends_id_and_status() {
        let v =
            serde_json::to_value(CampaignLifecycle::status_operation(7, Status::Paused)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"operator": "SET", "operand": {"id": 7, "status": "PAUSED"}})
        );
    }

    #[test]
    fn budget_removal_is_remove_by_id() {
        let v = serde_json::to_value(CampaignLifecycle::budget_removal(9)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"operator": "REMOVE", "operand": {"budgetId": 9}})
        );
    }
}
