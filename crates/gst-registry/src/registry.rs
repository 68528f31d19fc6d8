use std::collections::BTreeMap;
use std::sync::Arc;

use gst_config::{ConfigDocument, SecurityRequest};
use gst_md::{CustomDataCatalog, CustomDataType};
use gst_schemas::{
    Market, Resolution, ResourceKey, ResourceRegistration, SecurityType, Subscription,
};
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::platform::{Platform, PlatformError, SecurityCall};

enum Target {
    Custom(Arc<CustomDataType>),
    Standard(SecurityType),
}

/// Deduplicating cache of platform registrations.
///
/// Every distinct [`ResourceKey`] reaches the platform at most once. Equality
/// is raw token equality, so `SPX` and `spx` are two resources even though
/// they share a composite id.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    catalog: Arc<CustomDataCatalog>,
    by_key: BTreeMap<ResourceKey, Arc<ResourceRegistration>>,
    // composite id -> first registration stored under it
    by_id: BTreeMap<String, Arc<ResourceRegistration>>,
}

impl ResourceRegistry {
    pub fn new(catalog: Arc<CustomDataCatalog>) -> Self {
        Self {
            catalog,
            by_key: BTreeMap::new(),
            by_id: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &CustomDataCatalog {
        &self.catalog
    }

    /// Resolve every security request in the document, binding each one to
    /// its registration. Stops at the first failure.
    ///
    /// Returns the number of requests visited.
    pub fn register_all<P: Platform>(
        &mut self,
        document: &mut ConfigDocument,
        platform: &mut P,
    ) -> Result<usize, RegistryError> {
        let before = self.by_key.len();
        let mut visited = 0usize;
        for request in document.security_requests_mut() {
            self.resolve(request, platform)?;
            visited += 1;
        }
        info!(
            visited,
            registered = self.by_key.len() - before,
            total = self.by_key.len(),
            "security registration complete"
        );
        Ok(visited)
    }

    /// Resolve one declaration and bind the registration onto it in place.
    pub fn resolve<P: Platform>(
        &mut self,
        request: &mut SecurityRequest,
        platform: &mut P,
    ) -> Result<Arc<ResourceRegistration>, RegistryError> {
        let registration = self.resolve_key(&request.resource_key(), platform)?;
        request.bind(Arc::clone(&registration));
        Ok(registration)
    }

    /// Cached registration for `key`, registering with the platform on first
    /// sight.
    pub fn resolve_key<P: Platform>(
        &mut self,
        key: &ResourceKey,
        platform: &mut P,
    ) -> Result<Arc<ResourceRegistration>, RegistryError> {
        if let Some(existing) = self.by_key.get(key) {
            debug!(%key, "security already registered");
            return Ok(Arc::clone(existing));
        }

        let registration = Arc::new(self.register_new(key, platform)?);
        info!(
            key = %key,
            category = registration.subscription.category_label(),
            symbol = %registration.symbol,
            "security added"
        );

        self.by_key.insert(key.clone(), Arc::clone(&registration));
        self.by_id
            .entry(key.composite_id())
            .or_insert_with(|| Arc::clone(&registration));
        Ok(registration)
    }

    fn register_new<P: Platform>(
        &self,
        key: &ResourceKey,
        platform: &mut P,
    ) -> Result<ResourceRegistration, RegistryError> {
        // Category first: an unknown custom type is reported before token errors.
        let target = if key.is_custom_data() {
            let record_type = self
                .catalog
                .get(&key.ticker)
                .ok_or_else(|| RegistryError::UnknownCustomType { key: key.clone() })?;
            Target::Custom(record_type)
        } else {
            let category = SecurityType::from_token(&key.security_type)
                .ok_or_else(|| RegistryError::UnknownSecurityType { key: key.clone() })?;
            Target::Standard(category)
        };

        let resolution = Resolution::from_token(&key.resolution)
            .ok_or_else(|| RegistryError::UnknownResolution { key: key.clone() })?;
        let market = Market::from_token(&key.market)
            .ok_or_else(|| RegistryError::UnknownMarket { key: key.clone() })?;

        let platform_err = |e: PlatformError| RegistryError::Platform {
            key: key.clone(),
            message: e.to_string(),
        };

        let (subscription, security) = match target {
            Target::Custom(record_type) => {
                let security = platform
                    .add_data(&record_type, &key.ticker, resolution)
                    .map_err(platform_err)?;
                let sub = Subscription::CustomRecord {
                    type_id: record_type.type_id.clone(),
                    resolution,
                    market,
                };
                (sub, security)
            }
            Target::Standard(category) => {
                let call = SecurityCall::for_category(category)
                    .ok_or_else(|| RegistryError::UnmappedSecurityType { key: key.clone() })?;
                let security = platform
                    .add_security(call, &key.ticker, resolution, market)
                    .map_err(platform_err)?;
                let sub = Subscription::Standard {
                    category,
                    resolution,
                    market,
                };
                (sub, security)
            }
        };

        Ok(ResourceRegistration {
            key: key.clone(),
            subscription,
            symbol: security.symbol.clone(),
            security,
        })
    }

    pub fn get(&self, key: &ResourceKey) -> Option<Arc<ResourceRegistration>> {
        self.by_key.get(key).cloned()
    }

    /// Lookup by composite id (`garch_data_customdata_daily_usa`).
    pub fn by_id(&self, id: &str) -> Option<Arc<ResourceRegistration>> {
        self.by_id.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceRegistration>> {
        self.by_key.values()
    }

    /// Registrations whose subscription is a custom record feed.
    pub fn custom_registrations(&self) -> impl Iterator<Item = &Arc<ResourceRegistration>> {
        self.by_key
            .values()
            .filter(|r| r.subscription.custom_type_id().is_some())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
