//! Five-stage provisioning pipeline.
//!
//! `BUDGET → CAMPAIGN → ADGROUP → CRITERIA → AD`, each stage awaiting the
//! previous one and consuming its reference. The first failure ends the run.
//! Nothing created by earlier stages is rolled back; the [`RunLedger`]
//! returned with every run lists what was left behind.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use shared::ads_client::AdsApi;
use shared::config::Settings;
use strum_macros::Display;
use tracing::{info, warn};

use crate::error::{ProvisionError, Result};
use crate::provisioners::{
    AdCopy, AdGroupProvisioner, AdGroupRef, AdProvisioner, AdRef, AdRequest, AssetProvisioner,
    BudgetProvisioner, CampaignProvisioner, CriterionProvisioner, ImageSize, Provisioner,
    ResourceRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Budget,
    Campaign,
    #[serde(rename = "ADGROUP")]
    #[strum(serialize = "ADGROUP")]
    AdGroup,
    Criteria,
    Ad,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Budget,
        Stage::Campaign,
        Stage::AdGroup,
        Stage::Criteria,
        Stage::Ad,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageState {
    Pending,
    Running,
    Succeeded { reference: i64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    #[serde(flatten)]
    pub state: StageState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

/// Ordered record of every stage of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunLedger {
    stages: Vec<StageRecord>,
}

impl Default for RunLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLedger {
    pub fn new() -> Self {
        Self {
            stages: Stage::ALL
                .iter()
                .map(|&stage| StageRecord {
                    stage,
                    state: StageState::Pending,
                })
                .collect(),
        }
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.stages
    }

    pub fn state(&self, stage: Stage) -> &StageState {
        &self.stages[stage.index()].state
    }

    pub fn status(&self) -> RunStatus {
        if self
            .stages
            .iter()
            .any(|r| matches!(r.state, StageState::Failed { .. }))
        {
            RunStatus::Failed
        } else if self
            .stages
            .iter()
            .all(|r| matches!(r.state, StageState::Succeeded { .. }))
        {
            RunStatus::Succeeded
        } else {
            RunStatus::Running
        }
    }

    /// Resources created so far, in creation order.
    pub fn created(&self) -> Vec<(Stage, i64)> {
        self.stages
            .iter()
            .filter_map(|r| match r.state {
                StageState::Succeeded { reference } => Some((r.stage, reference)),
                _ => None,
            })
            .collect()
    }

    /// Moves `stage` to RUNNING. Only allowed while it is pending and its
    /// predecessor has succeeded.
    fn begin(&mut self, stage: Stage) -> Result<()> {
        let i = stage.index();
        let predecessor_ok = i == 0
            || matches!(self.stages[i - 1].state, StageState::Succeeded { .. });
        if !predecessor_ok || self.stages[i].state != StageState::Pending {
            return Err(ProvisionError::MissingReference { stage });
        }
        self.stages[i].state = StageState::Running;
        Ok(())
    }

    fn succeed(&mut self, stage: Stage, reference: i64) {
        self.stages[stage.index()].state = StageState::Succeeded { reference };
    }

    fn fail(&mut self, stage: Stage, error: &ProvisionError) {
        self.stages[stage.index()].state = StageState::Failed {
            error: error.to_string(),
        };
    }
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    pub ledger: RunLedger,
    pub result: Result<AdRef>,
}

impl PipelineRun {
    pub fn status(&self) -> RunStatus {
        self.ledger.status()
    }
}

pub struct Orchestrator {
    budgets: BudgetProvisioner,
    campaigns: CampaignProvisioner,
    ad_groups: AdGroupProvisioner,
    criteria: CriterionProvisioner,
    assets: AssetProvisioner,
    ads: AdProvisioner,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn AdsApi>, image_dir: impl Into<PathBuf>, copy: AdCopy) -> Self {
        Self {
            budgets: BudgetProvisioner::new(api.clone()),
            campaigns: CampaignProvisioner::new(api.clone()),
            ad_groups: AdGroupProvisioner::new(api.clone()),
            criteria: CriterionProvisioner::new(api.clone()),
            assets: AssetProvisioner::new(api.clone(), image_dir),
            ads: AdProvisioner::new(api, copy),
        }
    }

    pub fn from_settings(api: Arc<dyn AdsApi>, settings: &Settings) -> Self {
        Self::new(
            api,
            settings.image_dir.clone(),
            AdCopy::from_settings(settings),
        )
    }

    pub async fn run(&self) -> PipelineRun {
        let mut ledger = RunLedger::new();
        let result = self.drive(&mut ledger).await;
        match &result {
            Ok(ad) => info!(ad_id = ad.0, "provisioning run succeeded"),
            Err(e) => warn!(
                error = %e,
                left_behind = ?ledger.created(),
                "provisioning run failed; created resources are not rolled back"
            ),
        }
        PipelineRun { ledger, result }
    }

    async fn drive(&self, ledger: &mut RunLedger) -> Result<AdRef> {
        let budget = run_stage(ledger, Stage::Budget, self.budgets.create(())).await?;
        let campaign = run_stage(ledger, Stage::Campaign, self.campaigns.create(budget)).await?;
        let ad_group = run_stage(ledger, Stage::AdGroup, self.ad_groups.create(campaign)).await?;
        run_stage(ledger, Stage::Criteria, self.criteria.create(ad_group)).await?;
        run_stage(ledger, Stage::Ad, self.create_ad(ad_group)).await
    }

    /// Both image uploads must land before the ad that links them is sent.
    /// The uploads share no data, so they run concurrently.
    async fn create_ad(&self, ad_group: AdGroupRef) -> Result<AdRef> {
        let (large_image, square_image) = tokio::try_join!(
            self.assets.create(ImageSize::Landscape),
            self.assets.create(ImageSize::Square),
        )?;
        self.ads
            .create(AdRequest {
                ad_group,
                large_image,
                square_image,
            })
            .await
    }
}

async fn run_stage<T, F>(ledger: &mut RunLedger, stage: Stage, work: F) -> Result<T>
where
    T: ResourceRef,
    F: Future<Output = Result<T>>,
{
    ledger.begin(stage)?;
    info!(%stage, "stage running");
    match work.await {
        Ok(created) => {
            ledger.succeed(stage, created.id());
            info!(%stage, reference = created.id(), "stage succeeded");
            Ok(created)
        }
        Err(e) => {
            ledger.fail(stage, &e);
            warn!(%stage, error = %e, "stage failed");
            Err(e)
        }
    }
}
