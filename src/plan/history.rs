use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Lower-cased, trimmed meal titles seen in earlier plans.
pub type UsedTitles = HashSet<String>;

const LEGACY_MEAL_KEYS: [&str; 3] = ["breakfast", "lunch", "dinner"];

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Collect every meal title in a plans document.
///
/// History is best-effort input: a document that is not an array yields no
/// titles, and entries that don't look like plans are skipped.
pub fn used_meal_titles(history: &Value) -> UsedTitles {
    let mut titles = UsedTitles::new();

    let Some(entries) = history.as_array() else {
        if !history.is_null() {
            tracing::warn!("plan history is not an array, ignoring it");
        }
        return titles;
    };

    for (index, entry) in entries.iter().enumerate() {
        let before = titles.len();
        collect_entry_titles(entry, &mut titles);
        if titles.len() == before {
            tracing::debug!(index, "history entry contributed no meal titles");
        }
    }

    titles
}

/// Read a plans file and collect its meal titles. Any I/O or JSON error is
/// logged and treated as an empty history.
pub fn read_used_titles(path: &Path) -> UsedTitles {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return UsedTitles::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read plan history");
            return UsedTitles::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(history) => used_meal_titles(&history),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "plan history is not valid JSON");
            UsedTitles::new()
        }
    }
}

fn collect_entry_titles(entry: &Value, titles: &mut UsedTitles) {
    let Some(plan) = entry.get("plan") else {
        return;
    };

    let days = plan
        .get("weeklyPlan")
        .or_else(|| plan.get("weekly_plan"))
        .and_then(Value::as_array);

    for day in days.into_iter().flatten() {
        if let Some(meals) = day.get("meals").and_then(Value::as_array) {
            for meal in meals {
                insert_title(meal, titles);
            }
        } else {
            // older plans keyed each meal by its type
            for key in LEGACY_MEAL_KEYS {
                if let Some(meal) = day.get(key) {
                    insert_title(meal, titles);
                }
            }
        }
    }
}

fn insert_title(meal: &Value, titles: &mut UsedTitles) {
    if let Some(title) = meal.get("title").and_then(Value::as_str) {
        let title = normalize_title(title);
        if !title.is_empty() {
            titles.insert(title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn collects_titles_from_current_and_legacy_shapes() {
        let history = json!([
            {
                "id": "2",
                "plan": {
                    "weeklyPlan": [
                        { "day": "Day 1", "meals": [ { "title": "  Miso Salmon " }, { "title": "Pho" } ] }
                    ]
                }
            },
            {
                "id": "1",
                "plan": {
                    "weekly_plan": [
                        {
                            "day": "Day 1",
                            "breakfast": { "title": "Overnight oats with banana" },
                            "dinner": { "title": "Tomato pasta with beans" }
                        }
                    ]
                }
            }
        ]);

        let titles = used_meal_titles(&history);
        assert_eq!(titles.len(), 4);
        assert!(titles.contains("miso salmon"));
        assert!(titles.contains("overnight oats with banana"));
    }

    #[test]
    fn corrupt_entries_are_skipped() {
        let history = json!([
            "not an entry",
            { "plan": { "weeklyPlan": "nope" } },
            { "plan": { "weeklyPlan": [ { "meals": [ { "title": 42 }, { "title": "Dal" } ] } ] } }
        ]);
        let titles = used_meal_titles(&history);
        assert_eq!(titles, UsedTitles::from(["dal".to_string()]));
    }

    #[test]
    fn non_array_history_is_empty() {
        assert!(used_meal_titles(&json!({ "plans": [] })).is_empty());
        assert!(used_meal_titles(&Value::Null).is_empty());
    }

    #[test]
    fn unreadable_files_yield_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_used_titles(&dir.path().join("missing.json")).is_empty());

        let path = dir.path().join("plans.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "[{{\"plan\": ").unwrap();
        assert!(read_used_titles(&path).is_empty());
    }
}
