//! Collector registration and gathering.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::Desc;
use prometheus::{GaugeVec, Opts, TextEncoder};
use tokio::sync::mpsc;

use crate::exposition::metric::Metric;
use crate::exposition::{Collector, ExpositionError};

/// Capacity of the per-collection record channel.
///
/// A full channel blocks the collector until the registry drains it.
pub const CHANNEL_CAPACITY: usize = 64;

/// Wraps one collector and the descriptors it declared.
pub struct Registry<C> {
    collector: Arc<C>,
    descs: Vec<Arc<Desc>>,
}

impl<C: Collector> Registry<C> {
    /// Describe the collector and check its descriptors.
    ///
    /// Duplicate descriptors are rejected by a trial registration.
    pub async fn register(collector: C) -> Result<Self, ExpositionError> {
        let collector = Arc::new(collector);

        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let describing = Arc::clone(&collector);
        let produce = async move { describing.describe(&tx).await };
        let consume = async {
            let mut descs = Vec::new();
            while let Some(desc) = rx.recv().await {
                descs.push(desc);
            }
            descs
        };
        let ((), descs) = tokio::join!(produce, consume);

        build_families(&descs)?;

        tracing::info!(
            metrics = ?descs.iter().map(|d| d.fq_name.as_str()).collect::<Vec<_>>(),
            "Collector registered"
        );

        Ok(Self { collector, descs })
    }

    pub fn descs(&self) -> &[Arc<Desc>] {
        &self.descs
    }

    pub fn collector(&self) -> &Arc<C> {
        &self.collector
    }

    /// Run one collection and render it in text format.
    ///
    /// An invalid record fails the whole gather; nothing partial is returned.
    pub async fn gather(&self) -> Result<String, ExpositionError> {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let collector = Arc::clone(&self.collector);
        let produce = async move { collector.collect(&tx).await };
        let consume = async {
            let mut records = Vec::new();
            while let Some(metric) = rx.recv().await {
                records.push(metric);
            }
            records
        };
        let ((), records) = tokio::join!(produce, consume);

        let (registry, families) = build_families(&self.descs)?;
        for record in records {
            match record {
                Metric::Gauge(sample) => {
                    let family = families
                        .get(&sample.desc().id)
                        .ok_or_else(|| ExpositionError::Undescribed(sample.name().to_string()))?;
                    let values: Vec<&str> =
                        sample.label_values().iter().map(String::as_str).collect();
                    family.get_metric_with_label_values(&values)?.set(sample.value());
                }
                Metric::Invalid(invalid) => {
                    return Err(ExpositionError::Collect(invalid.to_string()));
                }
            }
        }

        let mut buffer = String::new();
        TextEncoder::new().encode_utf8(&registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Fresh gauge families for one gather, keyed by descriptor id.
///
/// Each gather gets its own registry so concurrent collections never share
/// values.
fn build_families(
    descs: &[Arc<Desc>],
) -> Result<(prometheus::Registry, HashMap<u64, GaugeVec>), ExpositionError> {
    let registry = prometheus::Registry::new();
    let mut families = HashMap::with_capacity(descs.len());

    for desc in descs {
        let labels: Vec<&str> = desc.variable_labels.iter().map(String::as_str).collect();
        let family = GaugeVec::new(Opts::new(desc.fq_name.clone(), desc.help.clone()), &labels)?;
        registry.register(Box::new(family.clone()))?;
        families.insert(desc.id, family);
    }

    Ok((registry, families))
}
