use crate::format::truncate_chars;
use rust_decimal::Decimal;

const PRODUCT_NAME_CHARS: usize = 20;

pub fn growth_insight(growth_percent: Decimal) -> String {
    format!("📈 Прогнозируется рост выручки на {growth_percent}% — подготовить запасы и персонал")
}

pub fn decline_insight(growth_percent: Decimal) -> String {
    format!(
        "📉 Прогнозируется снижение на {}% — рассмотреть маркетинговые акции",
        growth_percent.abs()
    )
}

pub fn uptrend_insight(slope: Decimal) -> String {
    format!("📊 Позитивный тренд: +{slope}/день — бизнес растёт")
}

pub fn downtrend_insight(slope: Decimal) -> String {
    format!("⚠️ Негативный тренд: {slope}/день — требуется анализ причин")
}

pub fn weekday_pattern_insight(
    best_day: &str,
    best_index: Decimal,
    worst_day: &str,
    worst_index: Decimal,
) -> String {
    format!(
        "📅 Лучший день: {best_day} (индекс {best_index}), худший: {worst_day} (индекс {worst_index})"
    )
}

pub fn high_accuracy_insight(mape: Decimal) -> String {
    format!("✅ Высокая точность прогноза (MAPE {mape}%)")
}

pub fn low_accuracy_insight(mape: Decimal) -> String {
    format!("⚠️ Низкая точность прогноза (MAPE {mape}%) — нужно больше данных")
}

fn short_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .take(3)
        .map(|n| truncate_chars(n, PRODUCT_NAME_CHARS))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lists up to three product names.
pub fn growing_demand_insight<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    format!("📈 Растущий спрос: {} — увеличить запасы", short_names(names))
}

pub fn declining_demand_insight<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    format!(
        "📉 Падающий спрос: {} — рассмотреть акции или вывод",
        short_names(names)
    )
}

pub fn confident_forecasts_insight(confident: usize, total: usize) -> String {
    format!("✅ Высокая точность прогноза для {confident} из {total} товаров")
}

pub fn top_category_insight(category: &str, total_forecast: Decimal) -> String {
    format!(
        "🏆 Топ категория: {category} — прогноз {} единиц",
        crate::format::fixed(total_forecast, 0)
    )
}

pub fn restock_insight(count: usize) -> String {
    format!("📦 Рекомендуется увеличить запасы для {count} позиций с растущим спросом")
}

pub fn insufficient_demand_data() -> String {
    "Недостаточно данных для прогнозирования".to_string()
}

/// Short month label for the yearly seasonality pattern; `month` is 1-based.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Янв",
        2 => "Фев",
        3 => "Мар",
        4 => "Апр",
        5 => "Май",
        6 => "Июн",
        7 => "Июл",
        8 => "Авг",
        9 => "Сен",
        10 => "Окт",
        11 => "Ноя",
        _ => "Дек",
    }
}
