use chrono::{Duration, NaiveDate, NaiveTime};
use configuration::Config;
use core_types::{AbcCategory, AnomalyKind, Severity};
use reports::{Dataset, Period, ProductRecord, Receipt, ReceiptLine, ReportAssembler, SeriesProvider};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

const DAYS: i64 = 70;

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn last_day() -> NaiveDate {
    first_day() + Duration::days(DAYS - 1)
}

fn product(id: u128, name: &str, category: Option<(u128, &str)>, price: Decimal, cost: Decimal) -> ProductRecord {
    ProductRecord {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        category_id: category.map(|(c, _)| Uuid::from_u128(c)),
        category_name: category.map(|(_, n)| n.to_string()),
        price,
        cost_price: cost,
    }
}

fn line(product: &ProductRecord) -> ReceiptLine {
    ReceiptLine {
        product_id: product.id,
        quantity: Decimal::ONE,
        total: product.price,
        cost_price: None,
    }
}

/// Seventy days of a small café. Latte sits on every even receipt and a
/// croissant on every fourth, so the pair is bought together twice as often
/// as chance would give. The last day has roughly three times the usual traffic.
fn cafe() -> Dataset {
    let latte = product(1, "Латте", Some((100, "Кофе")), dec!(250), dec!(60));
    let croissant = product(2, "Круассан", Some((101, "Выпечка")), dec!(180), dec!(50));
    let cheesecake = product(3, "Чизкейк", Some((102, "Десерты")), dec!(320), dec!(110));
    let water = product(4, "Вода", None, dec!(100), dec!(20));

    let mut receipts = Vec::new();
    let mut next_id = 1000u128;
    for i in 0..DAYS {
        let date = first_day() + Duration::days(i);
        let count = if i == DAYS - 1 { 80 } else { 20 + (i % 7) * 2 };
        for r in 0..count {
            let mut items = Vec::new();
            if r % 2 == 0 {
                items.push(line(&latte));
            }
            if r % 4 == 0 {
                items.push(line(&croissant));
            }
            if r % 5 == 0 {
                items.push(line(&cheesecake));
            }
            if r % 3 == 1 || items.is_empty() {
                items.push(line(&water));
            }
            let hour = 9 + (r % 10) as u32;
            next_id += 1;
            receipts.push(Receipt {
                id: Uuid::from_u128(next_id),
                opened_at: date.and_time(NaiveTime::from_hms_opt(hour, 15, 0).unwrap()),
                total: None,
                is_deleted: false,
                items,
            });
        }
    }

    // A voided receipt large enough to distort every figure if it were counted.
    receipts.push(Receipt {
        id: Uuid::from_u128(1),
        opened_at: first_day().and_hms_opt(12, 0, 0).unwrap(),
        total: Some(dec!(1000000)),
        is_deleted: true,
        items: vec![line(&water)],
    });

    Dataset {
        products: vec![latte, croissant, cheesecake, water],
        receipts,
    }
}

fn whole_period() -> Period {
    Period::new(first_day(), last_day()).unwrap()
}

#[test]
fn dataset_json_round_trips_through_the_provider() {
    let dataset = cafe();
    let json = serde_json::to_string(&dataset).unwrap();
    let restored = Dataset::from_json_str(&json).unwrap();

    assert_eq!(restored.last_date(), Some(last_day()));
    assert_eq!(
        restored.daily_metrics(whole_period()),
        dataset.daily_metrics(whole_period())
    );
}

#[test]
fn deleted_receipts_never_reach_the_daily_metrics() {
    let dataset = cafe();
    let metrics = dataset.daily_metrics(whole_period());

    assert_eq!(metrics.len(), DAYS as usize);
    assert_eq!(metrics[0].receipts, dec!(20));
    assert!(metrics[0].revenue < dec!(10000));
}

#[test]
fn menu_report_ranks_the_latte_first() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let report = assembler.menu_report(whole_period(), None).unwrap();

    assert_eq!(report.abc.products.len(), 4);
    assert_eq!(report.abc.products[0].product_name, "Латте");
    assert_eq!(report.abc.products[0].abc_category, AbcCategory::A);
    assert_eq!(report.xyz.len(), 4);
    assert!(
        report
            .abc
            .products
            .windows(2)
            .all(|w| w[0].revenue >= w[1].revenue)
    );
    assert_eq!(report.go_list.items.len(), 4);
    assert_eq!(
        Some(report.abc.in_category(AbcCategory::A).count()),
        report.abc.summary.get(&AbcCategory::A).map(|s| s.count)
    );
}

#[test]
fn basket_report_finds_the_coffee_and_croissant_pair() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let report = assembler.basket_report(whole_period()).unwrap();

    let pair = report
        .product_pairs
        .iter()
        .find(|p| {
            let names = [p.product_a_name.as_str(), p.product_b_name.as_str()];
            names.contains(&"Латте") && names.contains(&"Круассан")
        })
        .expect("latte and croissant are bought together");
    assert!(pair.lift > dec!(1.5));
    assert!(
        report
            .cross_sell
            .iter()
            .any(|c| c.trigger_product_name == "Круассан" && c.recommended_product_name == "Латте")
    );
}

#[test]
fn anomaly_report_flags_the_busy_last_day() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let report = assembler
        .anomaly_report(Period::ending(last_day(), 30))
        .unwrap();

    let spike = report
        .anomalies
        .iter()
        .find(|a| a.kind == AnomalyKind::RevenueSpike && a.date == last_day())
        .expect("the last day is a revenue spike");
    assert!(spike.severity >= Severity::High);
    assert!(report.requires_attention);
    assert_eq!(report.period_end, Some(last_day()));
}

/// Ninety quiet days of bottled water with one very busy day early on.
fn quiet_quarter(busy_day: i64) -> Dataset {
    let water = product(4, "Вода", None, dec!(100), dec!(20));
    let mut receipts = Vec::new();
    for i in 0..90 {
        let date = first_day() + Duration::days(i);
        let count = if i == busy_day {
            200
        } else if i % 2 == 0 {
            19
        } else {
            21
        };
        for r in 0..count {
            receipts.push(Receipt {
                id: Uuid::from_u128(((i as u128) << 16) + r as u128 + 1),
                opened_at: date.and_hms_opt(12, 0, 0).unwrap(),
                total: None,
                is_deleted: false,
                items: vec![line(&water)],
            });
        }
    }
    Dataset {
        products: vec![water],
        receipts,
    }
}

#[test]
fn anomaly_report_covers_the_whole_requested_period() {
    let dataset = quiet_quarter(40);
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let period = Period::ending(first_day() + Duration::days(89), 90);
    let report = assembler.anomaly_report(period).unwrap();

    let busy = first_day() + Duration::days(40);
    assert!(
        report
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::RevenueSpike && a.date == busy)
    );
    assert!(
        report
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::ProductSpike && a.date == busy)
    );
    assert_eq!(report.period_start, Some(first_day()));
    assert_eq!(report.period_end, Some(period.end));

    // A trailing month does not reach back to the busy day.
    let recent = assembler
        .anomaly_report(Period::ending(period.end, 30))
        .unwrap();
    assert!(recent.anomalies.iter().all(|a| a.date != busy));
    assert_eq!(recent.period_start, Some(period.end - Duration::days(29)));
}

#[test]
fn revenue_forecast_starts_after_the_last_sale() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let forecast = assembler.revenue_forecast(last_day()).unwrap();

    assert_eq!(forecast.forecast.len(), 30);
    assert_eq!(forecast.forecast_start, last_day() + Duration::days(1));
    assert!(forecast.accuracy.is_some());
    assert!(
        forecast
            .forecast
            .iter()
            .all(|p| p.lower_bound <= p.forecast && p.forecast <= p.upper_bound)
    );
    // Only the days with trading count as history.
    assert!(forecast.historical.len() <= DAYS as usize);
}

#[test]
fn quick_forecast_covers_a_week() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let points = assembler.quick_forecast(last_day()).unwrap();

    assert_eq!(points.len(), 7);
    assert!(points.iter().all(|p| p.forecast >= Decimal::ZERO));
}

#[test]
fn demand_forecast_covers_every_product_sold() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();
    let report = assembler.demand_forecast(last_day()).unwrap();

    assert_eq!(report.product_forecasts.len(), 4);
    assert_eq!(report.forecast_start, last_day() + Duration::days(1));
    for product in &report.product_forecasts {
        assert_eq!(product.forecast.len(), 14);
    }
    assert!(
        report
            .category_forecasts
            .iter()
            .any(|c| c.category_name == "Без категории")
    );
}

#[test]
fn reports_are_deterministic() {
    let dataset = cafe();
    let assembler = ReportAssembler::new(&dataset, &Config::default()).unwrap();

    let first = serde_json::to_string(&assembler.full_report(whole_period(), None).unwrap()).unwrap();
    let second = serde_json::to_string(&assembler.full_report(whole_period(), None).unwrap()).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_string(&assembler.demand_forecast(last_day()).unwrap()).unwrap();
    let second = serde_json::to_string(&assembler.demand_forecast(last_day()).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_configuration_fails_before_any_analysis() {
    let dataset = cafe();
    let mut config = Config::default();
    config.anomaly.window_days = 1;

    assert!(ReportAssembler::new(&dataset, &config).is_err());
}
