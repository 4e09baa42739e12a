use std::path::PathBuf;

use serde::Deserialize;

use crate::dto::API_VERSION;

fn default_ads_api_base_url() -> String {
    "https://adwords.google.com/api/adwords".into()
}

fn default_ads_api_version() -> String {
    API_VERSION.into()
}

fn default_user_agent() -> String {
    "campaign-manager".into()
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_ad_final_url() -> String {
    "http://www.example.com".into()
}

fn default_ad_business_name() -> String {
    "TestAd business name".into()
}

fn default_ad_text() -> String {
    "headlines".into()
}

fn default_http_bind() -> String {
    "0.0.0.0".into()
}

fn default_http_port() -> u16 {
    3000
}

fn default_reports_http_port() -> u16 {
    3001
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_ads_api_base_url")]
    pub ads_api_base_url: String,
    #[serde(default = "default_ads_api_version")]
    pub ads_api_version: String,
    #[serde(default)]
    pub developer_token: String,
    #[serde(default)]
    pub client_customer_id: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bearer token for the Ads API. Obtaining and refreshing it happens
    /// outside these services.
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    #[serde(default = "default_ad_final_url")]
    pub ad_final_url: String,
    #[serde(default = "default_ad_business_name")]
    pub ad_business_name: String,
    #[serde(default = "default_ad_text")]
    pub ad_text: String,
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_reports_http_port")]
    pub reports_http_port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ads_api_base_url: default_ads_api_base_url(),
            ads_api_version: default_ads_api_version(),
            developer_token: String::new(),
            client_customer_id: String::new(),
            user_agent: default_user_agent(),
            access_token: String::new(),
            image_dir: default_image_dir(),
            ad_final_url: default_ad_final_url(),
            ad_business_name: default_ad_business_name(),
            ad_text: default_ad_text(),
            http_bind: default_http_bind(),
            http_port: default_http_port(),
            reports_http_port: default_reports_http_port(),
        }
    }
}
