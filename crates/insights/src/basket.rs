use crate::format::{fixed, group_thousands};
use rust_decimal::Decimal;

/// `Предложите «B» при заказе «A» (вероятность 62%)`. Confidence is a fraction.
pub fn cross_sell_text(trigger: &str, recommended: &str, confidence: Decimal) -> String {
    format!(
        "Предложите «{recommended}» при заказе «{trigger}» (вероятность {}%)",
        fixed(confidence * Decimal::ONE_HUNDRED, 0)
    )
}

pub fn single_item_insight(single_item_percent: Decimal) -> String {
    format!(
        "⚠️ {single_item_percent}% чеков содержат только 1 позицию — большой потенциал для допродаж"
    )
}

pub fn small_basket_insight() -> String {
    "📊 Средний чек содержит менее 2 позиций — внедрить комбо-предложения".to_string()
}

pub fn combo_insight(product_a: &str, product_b: &str, lift: Decimal) -> String {
    format!(
        "🔥 «{product_a}» + «{product_b}» — покупают вместе в {}x чаще (создать комбо)",
        fixed(lift, 1)
    )
}

pub fn strong_links_insight(count: usize) -> String {
    format!("💡 Найдено {count} сильных связей между товарами — использовать для выкладки и предложений")
}

pub fn cross_sell_potential_insight(total_potential: Decimal) -> String {
    format!(
        "💰 Потенциал допродаж: до {} ₽ при правильных рекомендациях",
        group_thousands(total_potential)
    )
}

pub fn best_recommendation_insight(text: &str) -> String {
    format!("🎯 Лучшая рекомендация: {text}")
}

pub fn category_affinity_insight(category_a: &str, category_b: &str) -> String {
    format!("📦 Категории «{category_a}» и «{category_b}» часто покупают вместе — разместить рядом")
}
