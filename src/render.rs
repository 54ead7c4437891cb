//! Terminal tables for each report.

use anomaly::AnomalyReport;
use basket::BasketReport;
use comfy_table::{Table, presets::UTF8_FULL};
use forecast::{DemandForecastReport, ForecastPoint, RevenueForecast};
use reports::{FullReport, MenuReport};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn insights(lines: &[String]) {
    for line in lines {
        println!("• {line}");
    }
}

pub fn menu(report: &MenuReport) {
    println!("Меню: {} – {}", report.period.start, report.period.end);

    let mut abc = table(&["Товар", "Категория", "Выручка", "Доля, %", "Накоп., %", "Маржа, %", "ABC"]);
    for p in &report.abc.products {
        abc.add_row(vec![
            p.product_name.clone(),
            p.category_name.clone().unwrap_or_default(),
            p.revenue.to_string(),
            p.revenue_percent.to_string(),
            p.cumulative_percent.to_string(),
            p.margin_percent.to_string(),
            p.abc_category.to_string(),
        ]);
    }
    println!("{abc}");

    let mut xyz = table(&["Товар", "Среднее в день", "CV, %", "XYZ"]);
    for p in &report.xyz {
        xyz.add_row(vec![
            p.product_name.clone(),
            p.avg_daily_quantity.to_string(),
            p.coefficient_of_variation.to_string(),
            p.xyz_category.to_string(),
        ]);
    }
    println!("{xyz}");

    let mut go = table(&["Товар", "Группа", "Рекомендация"]);
    for item in &report.go_list.items {
        go.add_row(vec![
            item.product_name.clone(),
            item.go_list_category.to_string(),
            item.recommendation.clone(),
        ]);
    }
    println!("{go}");
    insights(&report.go_list.recommendations);

    let mut categories = table(&["Категория", "Товаров", "Выручка", "Доля, %"]);
    for c in &report.categories {
        categories.add_row(vec![
            c.category_name.clone(),
            c.products_count.to_string(),
            c.revenue.to_string(),
            c.revenue_percent.to_string(),
        ]);
    }
    println!("{categories}");
}

pub fn basket(report: &BasketReport) {
    let profile = &report.profile;
    println!(
        "Чеков: {}, в среднем позиций: {}, средний чек: {}",
        profile.total_baskets, profile.avg_items, profile.avg_value
    );

    let mut pairs = table(&["Товар A", "Товар B", "Вместе", "Поддержка", "Лифт"]);
    for p in &report.product_pairs {
        pairs.add_row(vec![
            p.product_a_name.clone(),
            p.product_b_name.clone(),
            p.co_occurrence_count.to_string(),
            p.support.to_string(),
            p.lift.to_string(),
        ]);
    }
    println!("{pairs}");

    let mut cross = table(&["Рекомендация", "Уверенность", "Потенциал"]);
    for c in &report.cross_sell {
        cross.add_row(vec![
            c.recommendation_text.clone(),
            c.confidence.to_string(),
            c.potential_revenue.to_string(),
        ]);
    }
    println!("{cross}");

    let mut affinity = table(&["Категория A", "Категория B", "Вместе", "Аффинити"]);
    for a in &report.category_affinities {
        affinity.add_row(vec![
            a.category_a_name.clone(),
            a.category_b_name.clone(),
            a.co_occurrence_count.to_string(),
            a.affinity_score.to_string(),
        ]);
    }
    println!("{affinity}");
    insights(&report.insights);
}

pub fn anomalies(report: &AnomalyReport) {
    let mut anomalies = table(&["Дата", "Тип", "Важность", "Факт", "Ожидание", "Откл., %", "Описание"]);
    for a in &report.anomalies {
        let date = match a.hour {
            Some(hour) => format!("{} {hour:02}:00", a.date),
            None => a.date.to_string(),
        };
        anomalies.add_row(vec![
            date,
            a.kind.to_string(),
            a.severity.to_string(),
            a.actual_value.to_string(),
            a.expected_value.to_string(),
            a.deviation_percent.to_string(),
            a.description.clone(),
        ]);
    }
    println!("{anomalies}");
    insights(&report.insights);
}

pub fn points(title: &str, points: &[ForecastPoint]) {
    println!("{title}");
    let mut forecast = table(&["Дата", "Прогноз", "Мин.", "Макс."]);
    for p in points {
        forecast.add_row(vec![
            p.date.to_string(),
            p.forecast.to_string(),
            p.lower_bound.to_string(),
            p.upper_bound.to_string(),
        ]);
    }
    println!("{forecast}");
}

pub fn revenue(forecast: &RevenueForecast) {
    points(
        &format!("Прогноз выручки: {} – {}", forecast.forecast_start, forecast.forecast_end),
        &forecast.forecast,
    );
    println!(
        "Итого: {}, в среднем за день: {}, рост: {}%, тренд: {}",
        forecast.total_forecast, forecast.avg_daily_forecast, forecast.growth_percent, forecast.trend.direction
    );
    if let Some(accuracy) = &forecast.accuracy {
        println!(
            "MAPE: {}%, RMSE: {}, MAE: {}, R²: {}",
            accuracy.mape, accuracy.rmse, accuracy.mae, accuracy.r_squared
        );
    }
    for component in &forecast.seasonality {
        let pattern: Vec<String> = component
            .pattern
            .iter()
            .map(|f| format!("{} {}", f.label, f.factor))
            .collect();
        println!("{} ({}): {}", component.name, component.strength, pattern.join(", "));
    }
    insights(&forecast.insights);
}

pub fn demand(report: &DemandForecastReport) {
    println!("Прогноз спроса: {} – {}", report.forecast_start, report.forecast_end);
    let mut products = table(&["Товар", "Прогноз", "В день", "Было в день", "Тренд", "Уверенность"]);
    for p in &report.product_forecasts {
        products.add_row(vec![
            p.product_name.clone(),
            p.total_forecast.to_string(),
            p.avg_daily_forecast.to_string(),
            p.historical_avg.to_string(),
            p.trend.to_string(),
            p.confidence_score.to_string(),
        ]);
    }
    println!("{products}");

    let mut categories = table(&["Категория", "Прогноз", "Рост, %"]);
    for c in &report.category_forecasts {
        categories.add_row(vec![
            c.category_name.clone(),
            c.total_forecast.to_string(),
            c.growth_percent.to_string(),
        ]);
    }
    println!("{categories}");
    insights(&report.insights);
}

pub fn full(report: &FullReport) {
    menu(&report.menu);
    basket(&report.basket);
    anomalies(&report.anomalies);
}
