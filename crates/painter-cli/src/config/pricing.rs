//! Unit price configuration.

use clap::Args;
use painter_core::{PriceTable, UnitPrice};

/// Per-token prices used to estimate cost.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Dollars per token of an image extraction call
    #[arg(long, env = "PAINTER_IMAGE_PRICE", default_value = PriceTable::DEFAULT_IMAGE_PRICE)]
    pub image_price: UnitPrice,

    /// Dollars per token of a text recommendation call
    #[arg(long, env = "PAINTER_TEXT_PRICE", default_value = PriceTable::DEFAULT_TEXT_PRICE)]
    pub text_price: UnitPrice,
}

impl PricingConfig {
    /// Returns the price table.
    pub fn price_table(&self) -> PriceTable {
        PriceTable::new(self.image_price.clone(), self.text_price.clone())
    }
}
