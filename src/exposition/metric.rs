//! Records a collector emits during one cycle.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use prometheus::core::Desc;

use crate::exposition::ExpositionError;

/// Describe a gauge family without constant labels.
///
/// Name and label grammar is checked by `prometheus`.
pub fn gauge_desc(name: &str, help: &str, labels: &[&str]) -> Result<Desc, ExpositionError> {
    let labels = labels.iter().map(|l| l.to_string()).collect();
    Ok(Desc::new(
        name.to_string(),
        help.to_string(),
        labels,
        HashMap::new(),
    )?)
}

/// A gauge value fixed at collection time.
#[derive(Debug, Clone)]
pub struct Sample {
    desc: Arc<Desc>,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    /// Build a sample, checking the label values against the descriptor.
    pub fn new<I, S>(desc: &Arc<Desc>, value: f64, label_values: I) -> Result<Self, ExpositionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label_values: Vec<String> = label_values.into_iter().map(Into::into).collect();
        if label_values.len() != desc.variable_labels.len() {
            return Err(ExpositionError::LabelCardinality {
                metric: desc.fq_name.clone(),
                expected: desc.variable_labels.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            desc: Arc::clone(desc),
            value,
            label_values,
        })
    }

    pub fn desc(&self) -> &Arc<Desc> {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }
}

/// One record emitted by a collection.
#[derive(Debug, Clone)]
pub enum Metric {
    Gauge(Sample),
    /// The collection failed; replaces every other record of the cycle.
    Invalid(InvalidMetric),
}

impl Metric {
    pub fn gauge<I, S>(desc: &Arc<Desc>, value: f64, label_values: I) -> Result<Self, ExpositionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sample::new(desc, value, label_values).map(Metric::Gauge)
    }

    pub fn invalid<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Metric::Invalid(InvalidMetric {
            error: Arc::new(error),
        })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Metric::Invalid(_))
    }
}

/// Error carrier for a failed collection.
#[derive(Debug, Clone)]
pub struct InvalidMetric {
    error: Arc<dyn StdError + Send + Sync>,
}

impl InvalidMetric {
    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

impl fmt::Display for InvalidMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}
