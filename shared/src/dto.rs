//! Wire model of the Ads API.
//!
//! Request types only serialize; the platform echoes back far more than we
//! send, so responses are decoded into the lean `*Entry` types further down.
//! Type discriminators travel as `xsi:type` exactly as the platform names them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// API version every service URL and report download is pinned to.
pub const API_VERSION: &str = "v201809";

/// Page size the platform recommends for `get` selectors.
pub const RECOMMENDED_PAGE_SIZE: i32 = 500;

/// One currency unit expressed in micros.
pub const ONE_UNIT_MICROS: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AdsService {
    BudgetService,
    CampaignService,
    AdGroupService,
    AdGroupCriterionService,
    AssetService,
    AdGroupAdService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Add,
    Set,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Enabled,
    Paused,
    Removed,
    /// Any status this client does not model.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiddingStrategyType {
    ManualCpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgeRangeType {
    #[serde(rename = "AGE_RANGE_25_34")]
    AgeRange25To34,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "xsi:type", rename = "Money", rename_all = "camelCase")]
pub struct Money {
    pub micro_amount: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
}

/// Reference from a campaign to the budget it spends from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLink {
    #[serde(default, deserialize_with = "long_id::optional")]
    pub budget_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum Bid {
    CpaBid { bid: Money },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiddingStrategyConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_type: Option<BiddingStrategyType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<Bid>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertising_channel_type: Option<ChannelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_configuration: Option<BiddingStrategyConfiguration>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    pub campaign_id: i64,
    pub name: String,
    pub status: Status,
    pub bidding_strategy_configuration: BiddingStrategyConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum Criterion {
    #[serde(rename_all = "camelCase")]
    Keyword { text: String, match_type: MatchType },
    #[serde(rename_all = "camelCase")]
    AgeRange { id: i64, age_range_type: AgeRangeType },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum AdGroupCriterion {
    #[serde(rename_all = "camelCase")]
    BiddableAdGroupCriterion { ad_group_id: i64, criterion: Criterion },
    #[serde(rename_all = "camelCase")]
    NegativeAdGroupCriterion { ad_group_id: i64, criterion: Criterion },
}

/// Asset uploaded through `AssetService`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum Asset {
    #[serde(rename_all = "camelCase")]
    ImageAsset { asset_subtype: String, image_data: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "xsi:type", rename = "ImageDimensionInfo", rename_all = "camelCase")]
pub struct ImageDimensionInfo {
    pub image_height: u32,
    pub image_width: u32,
}

/// Asset as referenced from inside an ad.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum LinkedAsset {
    #[serde(rename_all = "camelCase")]
    ImageAsset { asset_id: i64, full_size_info: ImageDimensionInfo },
    #[serde(rename_all = "camelCase")]
    TextAsset { asset_text: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type", rename = "AssetLink")]
pub struct AssetLink {
    pub asset: LinkedAsset,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "xsi:type")]
pub enum Ad {
    #[serde(rename_all = "camelCase")]
    MultiAssetResponsiveDisplayAd {
        final_urls: Vec<String>,
        marketing_images: AssetLink,
        square_marketing_images: AssetLink,
        headlines: AssetLink,
        long_headline: AssetLink,
        descriptions: AssetLink,
        business_name: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupAd {
    pub ad_group_id: i64,
    pub ad: Ad,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Budget(Budget),
    Campaign(Campaign),
    AdGroup(AdGroup),
    Criterion(AdGroupCriterion),
    Asset(Asset),
    Ad(AdGroupAd),
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub operator: Operator,
    pub operand: Operand,
}

impl Operation {
    pub fn add(operand: Operand) -> Self {
        Self { operator: Operator::Add, operand }
    }

    pub fn set(operand: Operand) -> Self {
        Self { operator: Operator::Set, operand }
    }

    pub fn remove(operand: Operand) -> Self {
        Self { operator: Operator::Remove, operand }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOperator {
    Equals,
}

#[derive(Debug, Clone, Serialize)]
pub struct Predicate {
    pub field: String,
    pub operator: PredicateOperator,
    pub values: Vec<String>,
}

impl Predicate {
    pub fn equals(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            operator: PredicateOperator::Equals,
            values: vec![value.to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Ascending,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub start_index: i32,
    pub number_results: i32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            start_index: 0,
            number_results: RECOMMENDED_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ordering: Vec<OrderBy>,
    pub paging: Paging,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    pub report_name: String,
    pub report_type: String,
    pub fields: Vec<String>,
    pub filters: Vec<Predicate>,
    pub date_range_type: String,
    pub format: String,
}

/// Platform ids are `xsd:long` and arrive either as JSON numbers or as
/// decimal strings.
mod long_id {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    fn parse<E: Error>(raw: Raw) -> Result<i64, E> {
        match raw {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(&s), &"an xsd:long id")),
        }
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        parse(Raw::deserialize(d)?)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Option::<Raw>::deserialize(d)?.map(parse).transpose()
    }
}

/// Result of a `get` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(default)]
    pub total_num_entries: i64,
}

/// Result of a `mutate` call: one entry per operation, in request order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutateResult {
    #[serde(default)]
    pub value: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEntry {
    #[serde(deserialize_with = "long_id::required")]
    pub budget_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignEntry {
    #[serde(default, deserialize_with = "long_id::optional")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub budget: Option<BudgetLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdEntry {
    #[serde(deserialize_with = "long_id::required")]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CriterionEntry {
    pub criterion: IdEntry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    #[serde(deserialize_with = "long_id::required")]
    pub asset_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdGroupAdEntry {
    pub ad: IdEntry,
}
