//! Texts attached to detected anomalies and to the anomaly report.

use crate::format::{fixed, truncate_chars};
use chrono::Weekday;
use core_types::{AnomalyKind, Severity};
use rust_decimal::Decimal;

pub const REVENUE_METRIC: &str = "Выручка";
pub const RECEIPTS_METRIC: &str = "Количество чеков";
pub const AVG_CHECK_METRIC: &str = "Средний чек";

const MAX_CAUSES: usize = 4;
const MAX_ACTIONS: usize = 3;
const PRODUCT_NAME_CHARS: usize = 30;

/// Metric label for a single product's sales series.
pub fn product_metric(product_name: &str) -> String {
    format!("Продажи «{}»", truncate_chars(product_name, PRODUCT_NAME_CHARS))
}

/// Metric label for revenue booked within one hour of the day.
pub fn hourly_metric(hour: u32) -> String {
    format!("Выручка в {hour}:00")
}

fn direction_word(is_spike: bool) -> &'static str {
    if is_spike { "выше" } else { "ниже" }
}

/// `"<metric>: выше нормы на 12.5%"`.
pub fn description(metric_name: &str, is_spike: bool, deviation_percent: Decimal) -> String {
    format!(
        "{metric_name}: {} нормы на {}%",
        direction_word(is_spike),
        fixed(deviation_percent.abs(), 1)
    )
}

/// `"Аномалия в 13:00: ниже нормы на 40.0%"`.
pub fn hourly_description(hour: u32, is_spike: bool, deviation_percent: Decimal) -> String {
    format!(
        "Аномалия в {hour}:00: {} нормы на {}%",
        direction_word(is_spike),
        fixed(deviation_percent.abs(), 1)
    )
}

/// Candidate causes, at most four. Hourly anomalies borrow the revenue causes
/// for their direction; the caller picks the matching revenue kind.
pub fn possible_causes(kind: AnomalyKind) -> Vec<String> {
    let causes: &[&str] = match kind {
        AnomalyKind::RevenueSpike => &[
            "Праздничный день или событие",
            "Успешная маркетинговая акция",
            "Большой корпоративный заказ",
            "Погодные условия (хорошая погода)",
        ],
        AnomalyKind::RevenueDrop => &[
            "Технические проблемы (POS, интернет)",
            "Погодные условия (плохая погода)",
            "Ремонтные работы рядом",
            "Конкурентная активность",
            "Отсутствие ключевых позиций меню",
        ],
        AnomalyKind::TrafficSpike => &[
            "Мероприятие в районе",
            "Вирусный пост в соцсетях",
            "Праздничный день",
            "Акция «приведи друга»",
        ],
        AnomalyKind::TrafficDrop => &[
            "Плохая погода",
            "Проблемы с доступностью",
            "Конкурент открыл акцию",
            "Технические проблемы",
        ],
        AnomalyKind::AvgCheckSpike => &[
            "Корпоративный заказ",
            "Успешный апселл",
            "Премиум-клиенты",
            "Новое дорогое меню",
        ],
        AnomalyKind::AvgCheckDrop => &[
            "Много мелких заказов (кофе с собой)",
            "Активная скидочная акция",
            "Изменение целевой аудитории",
        ],
        AnomalyKind::ProductSpike => &[
            "Вирусная популярность",
            "Акция на товар",
            "Сезонный спрос",
            "Рекомендации официантов",
        ],
        AnomalyKind::ProductDrop => &[
            "Отсутствие ингредиентов",
            "Изменение рецептуры",
            "Конец сезона",
            "Негативный отзыв",
        ],
        AnomalyKind::HourlyAnomaly => &[],
    };
    causes.iter().take(MAX_CAUSES).map(|c| c.to_string()).collect()
}

/// Recommended actions, at most three. High and critical revenue or traffic
/// drops lead with an urgent call to action.
pub fn recommended_actions(kind: AnomalyKind, severity: Severity) -> Vec<String> {
    let base: &[&str] = match kind {
        AnomalyKind::RevenueDrop | AnomalyKind::TrafficDrop => &[
            "Проверить технические системы",
            "Проанализировать отзывы за этот день",
            "Сравнить с конкурентами",
        ],
        AnomalyKind::RevenueSpike | AnomalyKind::TrafficSpike => &[
            "Определить причину успеха",
            "Рассмотреть повторение стратегии",
            "Подготовить запасы на будущее",
        ],
        AnomalyKind::AvgCheckDrop => &[
            "Обучить персонал техникам апселла",
            "Проверить эффективность акций",
            "Пересмотреть скидочную политику",
        ],
        AnomalyKind::ProductDrop => &[
            "Проверить наличие ингредиентов",
            "Проверить качество блюда",
            "Рассмотреть продвижение товара",
        ],
        AnomalyKind::ProductSpike => &[
            "Увеличить запасы ингредиентов",
            "Рассмотреть повышение цены",
            "Добавить в рекомендации",
        ],
        AnomalyKind::HourlyAnomaly => return hourly_actions(),
        AnomalyKind::AvgCheckSpike => &[],
    };

    let urgent = matches!(kind, AnomalyKind::RevenueDrop | AnomalyKind::TrafficDrop)
        && severity >= Severity::High;

    let mut actions: Vec<String> = Vec::with_capacity(MAX_ACTIONS + 1);
    if urgent {
        actions.push("⚠️ Срочно выяснить причину!".to_string());
    }
    actions.extend(base.iter().map(|a| a.to_string()));
    actions.truncate(MAX_ACTIONS);
    actions
}

pub fn hourly_actions() -> Vec<String> {
    vec![
        "Проверить события в это время".to_string(),
        "Сравнить с другими днями".to_string(),
    ]
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Понедельник",
        Weekday::Tue => "Вторник",
        Weekday::Wed => "Среда",
        Weekday::Thu => "Четверг",
        Weekday::Fri => "Пятница",
        Weekday::Sat => "Суббота",
        Weekday::Sun => "Воскресенье",
    }
}

/// Report-level label for the metric family an anomaly kind belongs to.
pub fn affected_metric_label(kind: AnomalyKind) -> &'static str {
    match kind {
        AnomalyKind::TrafficSpike | AnomalyKind::TrafficDrop => "Трафик",
        AnomalyKind::AvgCheckSpike | AnomalyKind::AvgCheckDrop => "Средний чек",
        AnomalyKind::ProductSpike | AnomalyKind::ProductDrop => "Продукты",
        _ => REVENUE_METRIC,
    }
}

pub fn critical_insight(count: usize) -> String {
    format!("🚨 Обнаружено {count} критических аномалий — требуется срочное внимание!")
}

pub fn recent_insight(count: usize) -> String {
    format!("📊 За последнюю неделю: {count} аномалий")
}

pub fn frequent_drops_insight(count: usize) -> String {
    format!("⚠️ Частые падения выручки ({count} раз) — проверить системные проблемы")
}

pub fn product_anomalies_insight(products: usize) -> String {
    format!("📦 Аномалии в продажах {products} товаров")
}

pub fn weekday_insight(weekday: &str) -> String {
    format!("📅 Больше всего аномалий в {weekday}")
}
