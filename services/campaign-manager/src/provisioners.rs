//! One provisioner per resource type.
//!
//! Each provisioner turns its typed input (the parent reference, or an image
//! size for assets) into the mutate call(s) the Ads API expects and hands
//! back the identifier of the created resource. Remote errors are returned
//! as received; retry and error policy belong to the orchestrator.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::ads_client::AdsApi;
use shared::config::Settings;
use shared::dto::{
    Ad, AdGroup, AdGroupAd, AdGroupAdEntry, AdGroupCriterion, AdsService, AgeRangeType, Asset,
    AssetEntry, AssetLink, Bid, BiddingStrategyConfiguration, BiddingStrategyType, Budget,
    BudgetEntry, BudgetLink, Campaign, ChannelType, Criterion, CriterionEntry, DeliveryMethod,
    IdEntry, ImageDimensionInfo, LinkedAsset, MatchType, Money, MutateResult, Operand, Operation,
    Status, ONE_UNIT_MICROS,
};
use strum_macros::Display;
use tracing::debug;

use crate::error::{ProvisionError, Result};
use crate::orchestrator::Stage;

pub const INCLUDED_KEYWORD: &str = "test search included";
pub const EXCLUDED_KEYWORD: &str = "test search excluded";

/// Identifier of a created resource, as recorded in the run ledger.
pub trait ResourceRef {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetRef(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampaignRef(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdGroupRef(pub i64);

/// Id of the included keyword, which also carries the age-range facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionRef(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetRef(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdRef(pub i64);

macro_rules! impl_resource_ref {
    ($($ty:ty),*) => {
        $(impl ResourceRef for $ty {
            fn id(&self) -> i64 {
                self.0
            }
        })*
    };
}

impl_resource_ref!(BudgetRef, CampaignRef, AdGroupRef, CriterionRef, AssetRef, AdRef);

/// Uniform create contract shared by all provisioners.
#[async_trait]
pub trait Provisioner: Send + Sync {
    type Input: Send;
    type Output: ResourceRef + Send;

    async fn create(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Time based suffix keeping generated resource names unique per run.
fn unique_suffix() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Decode the `index`-th entry of a mutate result.
fn entry<T: DeserializeOwned>(result: &MutateResult, index: usize, stage: Stage) -> Result<T> {
    let value = result
        .value
        .get(index)
        .cloned()
        .ok_or(ProvisionError::MissingReference { stage })?;
    serde_json::from_value(value).map_err(|e| {
        debug!(%stage, error = %e, "mutate result entry without usable id");
        ProvisionError::MissingReference { stage }
    })
}

pub struct BudgetProvisioner {
    api: Arc<dyn AdsApi>,
}

impl BudgetProvisioner {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self { api }
    }

    pub fn operation(suffix: i64) -> Operation {
        Operation::add(Operand::Budget(Budget {
            name: Some(format!("budget for {suffix}")),
            amount: Some(Money {
                micro_amount: ONE_UNIT_MICROS,
            }),
            delivery_method: Some(DeliveryMethod::Standard),
            ..Budget::default()
        }))
    }
}

#[async_trait]
impl Provisioner for BudgetProvisioner {
    type Input = ();
    type Output = BudgetRef;

    async fn create(&self, _input: ()) -> Result<BudgetRef> {
        let operation = Self::operation(unique_suffix());
        let result = self
            .api
            .mutate(AdsService::BudgetService, &[operation])
            .await?;
        let budget: BudgetEntry = entry(&result, 0, Stage::Budget)?;
        debug!(budget_id = budget.budget_id, "budget created");
        Ok(BudgetRef(budget.budget_id))
    }
}

pub struct CampaignProvisioner {
    api: Arc<dyn AdsApi>,
}

impl CampaignProvisioner {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self { api }
    }

    pub fn operation(budget: BudgetRef, suffix: i64) -> Operation {
        Operation::add(Operand::Campaign(Campaign {
            name: Some(format!("TestCampaign - {suffix}")),
            status: Some(Status::Enabled),
            budget: Some(BudgetLink {
                budget_id: Some(budget.0),
            }),
            advertising_channel_type: Some(ChannelType::Search),
            bidding_strategy_configuration: Some(BiddingStrategyConfiguration {
                bidding_strategy_type: Some(BiddingStrategyType::ManualCpc),
                bids: Vec::new(),
            }),
            ..Campaign::default()
        }))
    }
}

#[async_trait]
impl Provisioner for CampaignProvisioner {
    type Input = BudgetRef;
    type Output = CampaignRef;

    async fn create(&self, budget: BudgetRef) -> Result<CampaignRef> {
        let operation = Self::operation(budget, unique_suffix());
        let result = self
            .api
            .mutate(AdsService::CampaignService, &[operation])
            .await?;
        let campaign: IdEntry = entry(&result, 0, Stage::Campaign)?;
        debug!(campaign_id = campaign.id, budget_id = budget.0, "campaign created");
        Ok(CampaignRef(campaign.id))
    }
}

pub struct AdGroupProvisioner {
    api: Arc<dyn AdsApi>,
}

impl AdGroupProvisioner {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self { api }
    }

    pub fn operation(campaign: CampaignRef, suffix: i64) -> Operation {
        Operation::add(Operand::AdGroup(AdGroup {
            campaign_id: campaign.0,
            name: format!("TestAdgroup {suffix}"),
            status: Status::Enabled,
            bidding_strategy_configuration: BiddingStrategyConfiguration {
                bidding_strategy_type: None,
                bids: vec![Bid::CpaBid {
                    bid: Money {
                        micro_amount: ONE_UNIT_MICROS,
                    },
                }],
            },
        }))
    }
}

#[async_trait]
impl Provisioner for AdGroupProvisioner {
    type Input = CampaignRef;
    type Output = AdGroupRef;

    async fn create(&self, campaign: CampaignRef) -> Result<AdGroupRef> {
        let operation = Self::operation(campaign, unique_suffix());
        let result = self
            .api
            .mutate(AdsService::AdGroupService, &[operation])
            .await?;
        let group: IdEntry = entry(&result, 0, Stage::AdGroup)?;
        debug!(ad_group_id = group.id, campaign_id = campaign.0, "ad group created");
        Ok(AdGroupRef(group.id))
    }
}

pub struct CriterionProvisioner {
    api: Arc<dyn AdsApi>,
}

impl CriterionProvisioner {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self { api }
    }

    /// Included and excluded exact-match keywords, submitted as one batch.
    pub fn keyword_operations(ad_group: AdGroupRef) -> [Operation; 2] {
        let keyword = |text: &str| Criterion::Keyword {
            text: text.to_string(),
            match_type: MatchType::Exact,
        };
        [
            Operation::add(Operand::Criterion(
                AdGroupCriterion::BiddableAdGroupCriterion {
                    ad_group_id: ad_group.0,
                    criterion: keyword(INCLUDED_KEYWORD),
                },
            )),
            Operation::add(Operand::Criterion(
                AdGroupCriterion::NegativeAdGroupCriterion {
                    ad_group_id: ad_group.0,
                    criterion: keyword(EXCLUDED_KEYWORD),
                },
            )),
        ]
    }

    /// Attaches the age-range facet to an existing criterion id.
    pub fn age_range_operation(ad_group: AdGroupRef, criterion_id: i64) -> Operation {
        Operation::set(Operand::Criterion(
            AdGroupCriterion::BiddableAdGroupCriterion {
                ad_group_id: ad_group.0,
                criterion: Criterion::AgeRange {
                    id: criterion_id,
                    age_range_type: AgeRangeType::AgeRange25To34,
                },
            },
        ))
    }
}

#[async_trait]
impl Provisioner for CriterionProvisioner {
    type Input = AdGroupRef;
    type Output = CriterionRef;

    async fn create(&self, ad_group: AdGroupRef) -> Result<CriterionRef> {
        let keywords = Self::keyword_operations(ad_group);
        let result = self
            .api
            .mutate(AdsService::AdGroupCriterionService, &keywords)
            .await?;
        let included: CriterionEntry = entry(&result, 0, Stage::Criteria)?;
        let criterion_id = included.criterion.id;

        let age_range = Self::age_range_operation(ad_group, criterion_id);
        self.api
            .mutate(AdsService::AdGroupCriterionService, &[age_range])
            .await?;
        debug!(criterion_id, ad_group_id = ad_group.0, "criteria created");
        Ok(CriterionRef(criterion_id))
    }
}

/// The two image sizes every display ad needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ImageSize {
    #[strum(serialize = "600x315")]
    Landscape,
    #[strum(serialize = "300x300")]
    Square,
}

impl ImageSize {
    pub fn dimensions(self) -> ImageDimensionInfo {
        match self {
            ImageSize::Landscape => ImageDimensionInfo {
                image_height: 315,
                image_width: 600,
            },
            ImageSize::Square => ImageDimensionInfo {
                image_height: 300,
                image_width: 300,
            },
        }
    }

    pub fn file_name(self) -> String {
        format!("{self}.jpg")
    }
}

pub struct AssetProvisioner {
    api: Arc<dyn AdsApi>,
    image_dir: PathBuf,
}

impl AssetProvisioner {
    pub fn new(api: Arc<dyn AdsApi>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            image_dir: image_dir.into(),
        }
    }

    pub fn image_path(&self, size: ImageSize) -> PathBuf {
        self.image_dir.join(size.file_name())
    }

    pub fn operation(image: &[u8]) -> Operation {
        Operation::add(Operand::Asset(Asset::ImageAsset {
            asset_subtype: "IMAGE".into(),
            image_data: STANDARD.encode(image),
        }))
    }
}

#[async_trait]
impl Provisioner for AssetProvisioner {
    type Input = ImageSize;
    type Output = AssetRef;

    async fn create(&self, size: ImageSize) -> Result<AssetRef> {
        let path = self.image_path(size);
        let image = tokio::fs::read(&path)
            .await
            .map_err(|source| ProvisionError::ImageRead {
                path: path.clone(),
                source,
            })?;
        let operation = Self::operation(&image);
        let result = self
            .api
            .mutate(AdsService::AssetService, &[operation])
            .await?;
        let asset: AssetEntry = entry(&result, 0, Stage::Ad)?;
        debug!(asset_id = asset.asset_id, %size, "image asset uploaded");
        Ok(AssetRef(asset.asset_id))
    }
}

/// Fixed creative text and destination of the generated ad.
#[derive(Debug, Clone)]
pub struct AdCopy {
    pub final_url: String,
    pub business_name: String,
    pub text: String,
}

impl AdCopy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            final_url: settings.ad_final_url.clone(),
            business_name: settings.ad_business_name.clone(),
            text: settings.ad_text.clone(),
        }
    }
}

impl Default for AdCopy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdRequest {
    pub ad_group: AdGroupRef,
    pub large_image: AssetRef,
    pub square_image: AssetRef,
}

pub struct AdProvisioner {
    api: Arc<dyn AdsApi>,
    copy: AdCopy,
}

impl AdProvisioner {
    pub fn new(api: Arc<dyn AdsApi>, copy: AdCopy) -> Self {
        Self { api, copy }
    }

    pub fn operation(&self, request: &AdRequest) -> Operation {
        let text = || AssetLink {
            asset: LinkedAsset::TextAsset {
                asset_text: self.copy.text.clone(),
            },
        };
        let image = |asset: AssetRef, size: ImageSize| AssetLink {
            asset: LinkedAsset::ImageAsset {
                asset_id: asset.0,
                full_size_info: size.dimensions(),
            },
        };
        Operation::add(Operand::Ad(AdGroupAd {
            ad_group_id: request.ad_group.0,
            ad: Ad::MultiAssetResponsiveDisplayAd {
                final_urls: vec![self.copy.final_url.clone()],
                marketing_images: image(request.large_image, ImageSize::Landscape),
                square_marketing_images: image(request.square_image, ImageSize::Square),
                headlines: text(),
                long_headline: text(),
                descriptions: text(),
                business_name: self.copy.business_name.clone(),
            },
            status: Status::Enabled,
        }))
    }
}

#[async_trait]
impl Provisioner for AdProvisioner {
    type Input = AdRequest;
    type Output = AdRef;

    async fn create(&self, request: AdRequest) -> Result<AdRef> {
        let operation = self.operation(&request);
        let result = self
            .api
            .mutate(AdsService::AdGroupAdService, &[operation])
            .await?;
        let created: AdGroupAdEntry = entry(&result, 0, Stage::Ad)?;
        debug!(ad_id = created.ad.id, ad_group_id = request.ad_group.0, "ad created");
        Ok(AdRef(created.ad.id))
    }
}
