//! Provider trait
//!
//! The provider owns the configured session. Resources and data sources are
//! built on demand by type name, receiving that session by value through
//! their constructors, so nothing downstream ever downcasts provider data.

use crate::context::Context;
use crate::data_source::DataSource;
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Config, Diagnostic};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by every resource type name (e.g., "slack")
    fn type_name(&self) -> &str;

    /// Schema of the provider configuration block
    fn schema(&self) -> Schema;

    async fn configure(&mut self, ctx: Context, request: ConfigureProviderRequest)
        -> ConfigureProviderResponse;

    /// Fails with `ProviderNotConfigured` before `configure` succeeded
    fn create_resource(&self, type_name: &str) -> Result<Box<dyn Resource>>;

    fn create_data_source(&self, type_name: &str) -> Result<Box<dyn DataSource>>;

    fn resource_schemas(&self) -> HashMap<String, Schema>;

    fn data_source_schemas(&self) -> HashMap<String, Schema>;
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: Config,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
}
