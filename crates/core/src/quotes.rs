use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::AssetClass;

/// Collaborator seam for the external market-price API.
///
/// The core ships no concrete network provider; the host application
/// implements this trait and the core only consumes it during
/// [`crate::GroupTracker::refresh_prices`]. If the upstream API changes,
/// only the host's implementation moves.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteFeed: Send + Sync {
    /// Human-readable name of this feed (for logs/errors).
    fn name(&self) -> &str;

    /// Latest market price for a security.
    ///
    /// `quote_key` is the feed-specific lookup key when one was recorded on
    /// the holding; otherwise the display symbol is all there is.
    async fn latest_price(
        &self,
        symbol: &str,
        asset_class: AssetClass,
        quote_key: Option<&str>,
    ) -> Result<f64, CoreError>;
}
