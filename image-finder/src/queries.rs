//! Search query construction
//!
//! Recipe names are Italian while stock photo catalogues are mostly tagged
//! in English, so queries are built from a small translation table and
//! ordered from most to least specific.

/// Italian articles and prepositions that carry no visual meaning
const STOPWORDS: &[&str] = &[
    "di", "del", "della", "delle", "dei", "al", "alla", "alle", "con", "in", "per", "tipo",
];

/// IT -> EN lookup for categories, pasta shapes, breads and pizzas
const TRANSLATIONS: &[(&str, &str)] = &[
    // Categories
    ("pane", "bread"),
    ("pasta", "pasta"),
    ("pizza", "pizza"),
    ("focaccia", "focaccia"),
    ("lievitati", "pastry dough"),
    // Pasta shapes
    ("rigatoni", "rigatoni pasta"),
    ("spaghetti", "spaghetti"),
    ("maccheroni", "macaroni pasta"),
    ("fusilli", "fusilli pasta"),
    ("linguine", "linguine pasta"),
    ("tagliatelle", "tagliatelle egg pasta"),
    ("pappardelle", "pappardelle pasta"),
    ("orecchiette", "orecchiette pasta"),
    ("pici", "pici tuscan pasta"),
    ("malloreddus", "sardinian gnocchi malloreddus"),
    ("tajarin", "tajarin piedmont egg pasta"),
    ("pizzoccheri", "pizzoccheri buckwheat pasta"),
    ("gnocco", "gnocchi potato"),
    // Breads
    ("ciabatta", "ciabatta italian bread"),
    ("pagnotta", "round bread loaf"),
    ("filone", "italian bread loaf baguette"),
    ("casalingo", "homemade rustic bread"),
    ("integrale", "whole wheat bread loaf"),
    ("semola", "semolina bread puglia"),
    ("latte", "milk bread soft rolls"),
    ("noci", "walnut bread artisan"),
    ("olive", "olive bread mediterranean"),
    // Pizzas
    ("napoletana", "neapolitan pizza wood oven"),
    ("margherita", "margherita pizza basil mozzarella"),
    ("teglia", "roman pizza al taglio"),
];

const AI_KEYWORD_LIMIT: usize = 2;
const PAIR_SUFFIX: &str = "homemade";
const NAME_SUFFIX: &str = "italian homemade";
const CATEGORY_SUFFIX: &str = "italian traditional";

/// English form of a lowercase word, if the table knows it
pub fn translate(word: &str) -> Option<&'static str> {
    TRANSLATIONS
        .iter()
        .find(|(it, _)| *it == word)
        .map(|(_, en)| *en)
}

fn translate_or_keep(word: &str) -> &str {
    translate(word).unwrap_or(word)
}

fn is_significant(word: &str) -> bool {
    word.chars().count() > 2 && !STOPWORDS.contains(&word)
}

/// Lowercased words of a recipe name with `-`/`_` treated as spaces
fn name_words(recipe_name: &str) -> Vec<String> {
    recipe_name
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Build the ordered, deduplicated query list for a recipe.
pub fn build_search_queries(
    recipe_name: &str,
    category: &str,
    ai_keywords: &[String],
) -> Vec<String> {
    let words = name_words(recipe_name);
    let significant: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| is_significant(w))
        .collect();
    let main_word = significant
        .first()
        .copied()
        .or_else(|| words.first().map(String::as_str));

    let mut queries: Vec<String> = Vec::new();

    queries.extend(ai_keywords.iter().take(AI_KEYWORD_LIMIT).cloned());

    if let Some(translated) = main_word.and_then(translate) {
        queries.push(translated.to_string());
    }

    if significant.len() >= 2 {
        let pair = significant[..2]
            .iter()
            .map(|w| translate_or_keep(w))
            .collect::<Vec<_>>()
            .join(" ");
        queries.push(format!("{} {}", pair, PAIR_SUFFIX));
    }

    let simple_name = if significant.is_empty() {
        main_word.unwrap_or_default().to_string()
    } else {
        significant.iter().take(3).copied().collect::<Vec<_>>().join(" ")
    };
    if !simple_name.is_empty() {
        queries.push(format!("{} {}", simple_name, NAME_SUFFIX));
    }

    let category = category.trim().to_lowercase();
    if !category.is_empty() {
        queries.push(format!("{} {}", translate_or_keep(&category), CATEGORY_SUFFIX));
    }

    dedup_preserving_order(queries)
}

fn dedup_preserving_order(queries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.clone()))
        .collect()
}

/// Keywords the scorer looks for: the full recipe name plus the AI hints.
pub fn scoring_keywords(recipe_name: &str, ai_keywords: &[String]) -> Vec<String> {
    std::iter::once(recipe_name)
        .chain(ai_keywords.iter().map(String::as_str))
        .map(str::to_lowercase)
        .collect()
}
