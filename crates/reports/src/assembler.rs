use crate::error::ReportError;
use crate::provider::{Period, SeriesProvider};
use anomaly::{AnomalyDetector, AnomalyInputs, AnomalyReport};
use basket::{BasketAnalyzer, BasketReport};
use chrono::NaiveDate;
use configuration::Config;
use forecast::{DemandForecastReport, ForecastAnalyzer, ForecastPoint, RevenueForecast};
use menu::{AbcAnalysis, CategorySales, GoListResult, MenuAnalyzer, ProductMargin, ProductXyz};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the menu analyses say about one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuReport {
    pub period: Period,
    pub abc: AbcAnalysis,
    pub xyz: Vec<ProductXyz>,
    pub go_list: GoListResult,
    pub categories: Vec<CategorySales>,
    pub top_sellers: Vec<ProductMargin>,
    pub worst_sellers: Vec<ProductMargin>,
}

/// The fixed composition of menu, basket and anomaly reports for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub period: Period,
    pub menu: MenuReport,
    pub basket: BasketReport,
    pub anomalies: AnomalyReport,
}

/// Pulls series from a provider, runs one analyzer and packages its result.
pub struct ReportAssembler<'a, P: SeriesProvider> {
    provider: &'a P,
    menu: MenuAnalyzer,
    basket: BasketAnalyzer,
    anomaly: AnomalyDetector,
    forecast: ForecastAnalyzer,
}

impl<'a, P: SeriesProvider> ReportAssembler<'a, P> {
    /// Builds every analyzer from `config`; invalid parameters fail here,
    /// before any data is read.
    pub fn new(provider: &'a P, config: &Config) -> Result<Self, ReportError> {
        Ok(Self {
            provider,
            menu: MenuAnalyzer::new(config.menu.clone())?,
            basket: BasketAnalyzer::new(config.basket.clone())?,
            anomaly: AnomalyDetector::new(config.anomaly.clone())?,
            forecast: ForecastAnalyzer::new(config.forecast.clone())?,
        })
    }

    pub fn menu_report(&self, period: Period, margin_threshold: Option<Decimal>) -> Result<MenuReport, ReportError> {
        let aggregates = self.provider.product_aggregates(period);
        let series = self.provider.product_series(period);

        let abc = self.menu.classify_abc(&aggregates)?;
        let go_list = self.menu.go_list(&abc, margin_threshold);
        let report = MenuReport {
            period,
            xyz: self.menu.classify_xyz(&series),
            categories: self.menu.category_breakdown(&aggregates),
            top_sellers: self.menu.top_sellers(&aggregates, self.menu.params().metric),
            worst_sellers: self.menu.worst_sellers(&aggregates),
            go_list,
            abc,
        };
        info!(
            products = report.abc.products.len(),
            go_list = report.go_list.items.len(),
            "Menu report assembled"
        );
        Ok(report)
    }

    pub fn basket_report(&self, period: Period) -> Result<BasketReport, ReportError> {
        let baskets = self.provider.baskets(period);
        let catalog = self.provider.catalog();
        let report = self.basket.generate_report(&baskets, &catalog);
        info!(
            baskets = baskets.len(),
            pairs = report.product_pairs.len(),
            "Basket report assembled"
        );
        Ok(report)
    }

    /// Anomalies on every day of `period`. The provider is asked for
    /// `window_days` extra days before it to warm up the rolling baselines.
    pub fn anomaly_report(&self, period: Period) -> Result<AnomalyReport, ReportError> {
        let params = self.anomaly.params();
        let lookback = Period::ending(period.end, period.days() + params.window_days)
            .clamp_start(self.provider.data_start());
        let hourly_window = Period::ending(period.end, params.hourly_days);

        let inputs = AnomalyInputs {
            daily: self.provider.daily_metrics(lookback),
            products: if params.include_products {
                self.provider.product_series(lookback)
            } else {
                Vec::new()
            },
            hourly: if params.include_hourly {
                self.provider.hourly_readings(hourly_window)
            } else {
                Vec::new()
            },
        };
        let report = self
            .anomaly
            .generate_report(&inputs, period.end, Some(period.start))?;
        info!(
            anomalies = report.anomalies.len(),
            critical = report.critical_count,
            "Anomaly report assembled"
        );
        Ok(report)
    }

    fn history(&self, as_of: NaiveDate, days: usize) -> Period {
        Period::ending(as_of, days).clamp_start(self.provider.data_start())
    }

    /// Revenue forecast from the history ending on `as_of`.
    pub fn revenue_forecast(&self, as_of: NaiveDate) -> Result<RevenueForecast, ReportError> {
        let history = self
            .provider
            .revenue_series(self.history(as_of, self.forecast.params().history_days));
        Ok(self.forecast.forecast_revenue(&history)?)
    }

    pub fn quick_forecast(&self, as_of: NaiveDate) -> Result<Vec<ForecastPoint>, ReportError> {
        let history = self
            .provider
            .revenue_series(self.history(as_of, self.forecast.params().quick_history_days));
        Ok(self.forecast.quick_forecast(&history, as_of)?)
    }

    pub fn demand_forecast(&self, as_of: NaiveDate) -> Result<DemandForecastReport, ReportError> {
        let days = self.forecast.params().demand.history_days;
        let products = self.provider.product_series(self.history(as_of, days));
        let report = self.forecast.forecast_demand(&products, as_of);
        info!(
            products = report.product_forecasts.len(),
            "Demand forecast assembled"
        );
        Ok(report)
    }

    pub fn full_report(&self, period: Period, margin_threshold: Option<Decimal>) -> Result<FullReport, ReportError> {
        Ok(FullReport {
            period,
            menu: self.menu_report(period, margin_threshold)?,
            basket: self.basket_report(period)?,
            anomalies: self.anomaly_report(period)?,
        })
    }
}
