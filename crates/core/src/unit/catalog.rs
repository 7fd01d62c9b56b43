use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::copy::StoreCopyUnit;
use super::error::UnitError;
use super::http::{HttpBatchUnit, HttpFastUnit};
use super::traits::{BatchUnit, FastUnit};
use super::warehouse::WarehouseLoadUnit;
use crate::config::Config;
use crate::event::{DataFormat, Tier};
use crate::store::ObjectStore;

/// Lookup key for a converter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConverterKey {
    pub tier: Tier,
    pub format: DataFormat,
}

impl ConverterKey {
    pub fn new(tier: Tier, format: DataFormat) -> Self {
        Self { tier, format }
    }
}

/// Registry of processing units keyed by (tier, format).
///
/// Non-terminal tiers carry a fast unit per slot and optionally a batch
/// unit; the terminal tier carries a single model-load unit.
#[derive(Default)]
pub struct UnitCatalog {
    fast: HashMap<ConverterKey, Arc<dyn FastUnit>>,
    batch: HashMap<ConverterKey, Arc<dyn BatchUnit>>,
    model_load: Option<Arc<dyn FastUnit>>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fast(
        mut self,
        tier: Tier,
        format: DataFormat,
        unit: Arc<dyn FastUnit>,
    ) -> Self {
        self.fast.insert(ConverterKey::new(tier, format), unit);
        self
    }

    pub fn with_batch(
        mut self,
        tier: Tier,
        format: DataFormat,
        unit: Arc<dyn BatchUnit>,
    ) -> Self {
        self.batch.insert(ConverterKey::new(tier, format), unit);
        self
    }

    pub fn with_model_load(mut self, unit: Arc<dyn FastUnit>) -> Self {
        self.model_load = Some(unit);
        self
    }

    pub fn fast(&self, tier: Tier, format: DataFormat) -> Option<Arc<dyn FastUnit>> {
        self.fast.get(&ConverterKey::new(tier, format)).cloned()
    }

    pub fn batch(&self, tier: Tier, format: DataFormat) -> Option<Arc<dyn BatchUnit>> {
        self.batch.get(&ConverterKey::new(tier, format)).cloned()
    }

    pub fn model_load(&self) -> Option<Arc<dyn FastUnit>> {
        self.model_load.clone()
    }

    /// Build the catalog from configuration.
    ///
    /// Every (non-terminal tier, format) slot gets a fast unit: the
    /// configured HTTP endpoint where one exists, the in-process copy unit
    /// otherwise. Batch and model-load units exist only where configured.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, UnitError> {
        let mut catalog = Self::new();

        let copy_unit: Arc<dyn FastUnit> = Arc::new(StoreCopyUnit::new(store));
        for tier in [Tier::Stage, Tier::Curated] {
            for format in [
                DataFormat::Structured,
                DataFormat::SemiStructured,
                DataFormat::Unstructured,
            ] {
                catalog
                    .fast
                    .insert(ConverterKey::new(tier, format), copy_unit.clone());
            }
        }

        if let Some(units) = &config.units {
            for converter in &units.converters {
                let key = ConverterKey::new(converter.tier, converter.format);

                if let Some(endpoint) = &converter.fast_endpoint {
                    let label = format!(
                        "fast_convert:{}:{}",
                        converter.tier.as_str(),
                        converter.format.as_str()
                    );
                    catalog
                        .fast
                        .insert(key, Arc::new(HttpFastUnit::new(label, endpoint)));
                }

                if let Some(batch) = &converter.batch {
                    let label = format!(
                        "batch_convert:{}:{}",
                        converter.tier.as_str(),
                        converter.format.as_str()
                    );
                    catalog.batch.insert(
                        key,
                        Arc::new(HttpBatchUnit::new(
                            label,
                            batch.job_name.clone(),
                            batch.start_endpoint.clone(),
                            batch.status_endpoint.clone(),
                            Duration::from_secs(config.router.batch_poll_interval_secs),
                        )),
                    );
                }
            }

            if let Some(warehouse) = &units.warehouse {
                catalog.model_load = Some(Arc::new(WarehouseLoadUnit::new(warehouse)?));
            }
        }

        Ok(catalog)
    }
}
