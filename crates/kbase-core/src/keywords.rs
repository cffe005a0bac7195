//! Category → keyword table used for query-time reranking of knowledge sections.

use std::collections::HashMap;

use serde::Deserialize;

/// Score multiplier added per matched keyword.
pub const BOOST_PER_MATCH: f32 = 0.15;

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    (
        "indications",
        &[
            "плоскостопие", "шпора", "вальгус", "артроз", "мозоли", "диабет", "колени",
            "сколиоз", "остеохондроз", "беременность", "варикоз", "фасциит",
            "метатарзалгия", "молоткообразные", "боль в спине", "подходят при",
            "помогают при", "заболевания", "деформации",
        ],
    ),
    (
        "process",
        &[
            "материалы", "ЭВА", "слепок", "по слепку", "Trives", "Amcube", "сканирование",
            "3D", "моделирование", "изготовление",
        ],
    ),
    (
        "delivery",
        &["доставка", "самовывоз", "курьером", "забрать", "получить", "Гикало 1", "выдача"],
    ),
    ("manufacturing_time", &["сроки", "время", "дней", "ждать", "как долго"]),
    (
        "specialists",
        &["врачи", "ортопеды", "консультация", "прием", "специалист", "записаться", "запись"],
    ),
    ("locations", &["адреса", "филиалы", "салоны", "города", "где", "находится"]),
    (
        "contacts",
        &["телефон", "контакты", "связь", "email", "мессенджер", "позвонить", "написать"],
    ),
    ("prices", &["цены", "стоимость", "рубли", "скидка", "акция"]),
    ("payment", &["оплата", "платежи", "способы", "расчет", "карта", "наличные"]),
    (
        "advantages",
        &["преимущества", "эффект", "результаты", "пользу", "устойчивость", "кровообращение"],
    ),
    (
        "target_audience",
        &["аудитория", "назначение", "для кого", "кому", "подходит", "спортсмены", "спортивной"],
    ),
    (
        "mobile_cabinet",
        &["выездные", "выездной", "выезд", "расписание", "запись на выезд"],
    ),
];

/// Keywords per category key. Keywords are stored lowercased and
/// de-duplicated, preserving first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, Vec<String>>")]
pub struct CategoryKeywords {
    entries: HashMap<String, Vec<String>>,
}

impl CategoryKeywords {
    pub fn new<K, I, S>(entries: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for (key, words) in entries {
            table.insert(key, words);
        }
        table
    }

    /// The production table for the orthopedic-insole knowledge base.
    pub fn builtin() -> Self {
        Self::new(DEFAULT_TABLE.iter().map(|(k, words)| (*k, words.iter().copied())))
    }

    pub fn insert<I, S>(&mut self, key: impl Into<String>, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slot = self.entries.entry(key.into()).or_default();
        slot.clear();
        for w in words {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() && !slot.contains(&w) {
                slot.push(w);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `key`'s keywords occurring as substrings of `query_lower`.
    /// `query_lower` must already be lowercased.
    pub fn match_count(&self, key: &str, query_lower: &str) -> usize {
        self.get(key)
            .map(|words| words.iter().filter(|w| query_lower.contains(w.as_str())).count())
            .unwrap_or(0)
    }

    /// `1.0 + 0.15 * matches`, or exactly `1.0` when nothing matches.
    pub fn boost_factor(&self, key: &str, query_lower: &str) -> f32 {
        match self.match_count(key, query_lower) {
            0 => 1.0,
            n => 1.0 + BOOST_PER_MATCH * n as f32,
        }
    }
}

impl From<HashMap<String, Vec<String>>> for CategoryKeywords {
    fn from(raw: HashMap<String, Vec<String>>) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_lowercased() {
        let t = CategoryKeywords::builtin();
        assert_eq!(t.len(), 12);
        let process = t.get("process").unwrap();
        assert!(process.contains(&"эва".to_string()));
        assert!(process.contains(&"3d".to_string()));
        assert!(t.get("delivery").unwrap().contains(&"гикало 1".to_string()));
    }

    #[test]
    fn duplicates_collapse_in_first_seen_order() {
        let t = CategoryKeywords::new([("k", ["b", "A", "a", "b"])]);
        assert_eq!(t.get("k").unwrap(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn boost_counts_each_keyword_once() {
        let t = CategoryKeywords::new([("delivery", ["доставка", "самовывоз"])]);
        let q = "доставка доставка самовывоз";
        assert_eq!(t.match_count("delivery", q), 2);
        assert!((t.boost_factor("delivery", q) - 1.30).abs() < 1e-6);
        assert_eq!(t.boost_factor("delivery", "цены"), 1.0);
        assert_eq!(t.boost_factor("unknown", q), 1.0);
    }
}
