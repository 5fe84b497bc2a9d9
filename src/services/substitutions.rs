/// Ordered substitution table: key ingredient fragment and its alternatives
///
/// Lookup walks this slice in order, so earlier entries win when several
/// keys match the same ingredient.
pub const SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("butter", &["olive oil", "coconut oil", "margarine"]),
    ("milk", &["almond milk", "soy milk", "coconut milk"]),
    ("eggs", &["flax eggs", "chia eggs", "applesauce"]),
    ("flour", &["almond flour", "coconut flour", "oat flour"]),
    ("sugar", &["honey", "maple syrup", "stevia"]),
    ("chicken", &["tofu", "tempeh", "mushrooms"]),
    ("beef", &["lentils", "black beans", "portobello mushrooms"]),
    ("cheese", &["nutritional yeast", "cashew cheese", "vegan cheese"]),
    ("cream", &["coconut cream", "cashew cream", "silken tofu"]),
    ("bacon", &["tempeh bacon", "coconut bacon", "mushroom bacon"]),
    ("oil", &["butter", "ghee"]),
    ("onion", &["shallots", "garlic"]),
    ("garlic", &["garlic powder", "onion powder"]),
];

/// Substitutes for an ingredient, borrowed from the static table
///
/// Matches when a table key appears inside the ingredient name or the
/// ingredient name appears inside a key (case-insensitive).
pub fn lookup(ingredient: &str) -> &'static [&'static str] {
    let needle = ingredient.trim().to_lowercase();
    if needle.is_empty() {
        return &[];
    }

    SUBSTITUTIONS
        .iter()
        .find(|(key, _)| needle.contains(key) || key.contains(needle.as_str()))
        .map(|(_, subs)| *subs)
        .unwrap_or(&[])
}

/// Substitutes for an ingredient, in preference order
pub fn substitutes_for(ingredient: &str) -> Vec<String> {
    lookup(ingredient).iter().map(|s| s.to_string()).collect()
}
