use crate::affinity::{self, CategoryAffinity};
use crate::cross_sell::{self, CrossSellRecommendation};
use crate::error::BasketError;
use crate::pairs::{self, ProductPair};
use crate::profile::{self, BasketProfile, HourlyBasketPattern};
use crate::report::{self, BasketReport};
use configuration::BasketParams;
use core_types::{BasketRecord, Catalog};

/// Market-basket analysis with one set of thresholds.
#[derive(Debug, Clone)]
pub struct BasketAnalyzer {
    params: BasketParams,
}

impl BasketAnalyzer {
    /// Creates a new `BasketAnalyzer`. Out-of-range thresholds are rejected, never clamped.
    pub fn new(params: BasketParams) -> Result<Self, BasketError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BasketParams {
        &self.params
    }

    pub fn mine_pairs(&self, baskets: &[BasketRecord], catalog: &Catalog) -> Vec<ProductPair> {
        pairs::mine_pairs(
            baskets,
            catalog,
            self.params.min_support,
            self.params.min_occurrences,
            self.params.limit,
            self.params.max_basket_items,
        )
    }

    pub fn recommend_cross_sell(
        &self,
        pairs: &[ProductPair],
        catalog: &Catalog,
    ) -> Vec<CrossSellRecommendation> {
        cross_sell::recommend_cross_sell(
            pairs,
            catalog,
            self.params.min_confidence,
            self.params.min_lift,
            self.params.cross_sell_limit,
        )
    }

    pub fn category_affinity(&self, baskets: &[BasketRecord]) -> Vec<CategoryAffinity> {
        affinity::category_affinity(
            baskets,
            self.params.category_min_count,
            self.params.category_limit,
        )
    }

    pub fn basket_profile(&self, baskets: &[BasketRecord]) -> BasketProfile {
        profile::basket_profile(baskets)
    }

    pub fn hourly_patterns(
        &self,
        baskets: &[BasketRecord],
        pairs: &[ProductPair],
    ) -> Vec<HourlyBasketPattern> {
        profile::hourly_patterns(baskets, pairs)
    }

    /// Runs every basket analysis and derives the insights.
    pub fn generate_report(&self, baskets: &[BasketRecord], catalog: &Catalog) -> BasketReport {
        let profile = self.basket_profile(baskets);
        let product_pairs = self.mine_pairs(baskets, catalog);
        let cross_sell = self.recommend_cross_sell(&product_pairs, catalog);
        let category_affinities = self.category_affinity(baskets);
        let hourly_patterns = self.hourly_patterns(baskets, &product_pairs);
        let insights =
            report::generate_insights(&profile, &product_pairs, &cross_sell, &category_affinities);

        tracing::debug!(
            baskets = profile.total_baskets,
            pairs = product_pairs.len(),
            cross_sell = cross_sell.len(),
            affinities = category_affinities.len(),
            "Basket report generated"
        );

        BasketReport {
            profile,
            product_pairs,
            cross_sell,
            category_affinities,
            hourly_patterns,
            insights,
        }
    }
}
