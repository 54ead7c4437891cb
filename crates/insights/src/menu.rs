use core_types::GoListCategory;

/// Per-product advice for a Go-List cell.
pub fn go_list_recommendation(category: GoListCategory) -> &'static str {
    match category {
        GoListCategory::Stars => "Продвигать и выделять в меню",
        GoListCategory::Workhorses => "Рассмотреть повышение цены или снижение себестоимости",
        GoListCategory::Potential => "Повысить заметность и продвигать",
        GoListCategory::Standard => "Сохранить текущую позицию",
        GoListCategory::Puzzles => "Выяснить, почему продажи низкие",
        GoListCategory::Dogs => "Рассмотреть вывод из меню",
    }
}

pub fn review_dogs(count: usize) -> String {
    format!("Пересмотреть {count} позиций категории «Собаки» — кандидаты на вывод из меню")
}

pub fn investigate_puzzles(count: usize) -> String {
    format!("Изучить {count} «Загадок» — высокая маржа, но низкие продажи")
}

pub fn optimize_workhorses(count: usize) -> String {
    format!("Оптимизировать цены для {count} «Рабочих лошадок»")
}

pub fn feature_stars(count: usize) -> String {
    format!("Выделить {count} «Звёзд» в меню")
}
