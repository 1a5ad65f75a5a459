use std::sync::Arc;

use anyhow::{Context, Result};
use bugninja_shared::{
    cms_api::{CmsClient, CmsConfig},
    media::MediaUrlResolver,
};

use crate::config::SiteConfig;

/// Immutable per-process state; every request reads the CMS afresh.
#[derive(Clone)]
pub struct AppState {
    pub cms: CmsClient,
    pub media: MediaUrlResolver,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(cms_config: CmsConfig, site: SiteConfig) -> Result<Self> {
        let media = cms_config.media_resolver();
        let cms = CmsClient::new(cms_config).context("failed to build CMS client")?;
        Ok(Self {
            cms,
            media,
            site: Arc::new(site),
        })
    }
}
