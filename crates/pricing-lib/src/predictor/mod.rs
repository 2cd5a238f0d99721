//! Feature encoding and price prediction

mod features;
mod inference;
mod output;
mod schema;

pub use features::{one_hot_expand, training_name, FeatureEncoder, FeatureVector, FIELD_ALIASES};
pub use inference::{LinearRegressor, OnnxRegressor};
pub use output::{
    round_price, PlausibilityBounds, PredictionResult, PricePredictor, MAX_PLAUSIBLE_PRICE,
    MIN_PLAUSIBLE_PRICE, PRICE_DECIMALS,
};
pub use schema::FeatureSchema;

use anyhow::Result;

/// A trained regression model: a pure function from a feature vector to a price
pub trait RegressionModel: Send + Sync {
    /// Score one aligned feature vector
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Identifier of the loaded artifact
    fn version(&self) -> &str;

    /// Number of features the model expects, when known
    fn input_width(&self) -> Option<usize> {
        None
    }
}
