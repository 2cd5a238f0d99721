//! CLI command implementations

pub mod normalize;
pub mod predict;
pub mod schema;

use crate::config::Settings;
use pricing_lib::PricingPipeline;

/// Build the local pipeline from the effective settings
pub(crate) fn local_pipeline(settings: &Settings) -> PricingPipeline {
    PricingPipeline::from_config(&settings.pipeline)
}
