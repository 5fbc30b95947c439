/// Derive the URL slug of a category name: lowercase ASCII words joined by
/// single hyphens, with `&` spelled out as `and`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(|c| c.to_lowercase()) {
        if c == '&' {
            push_word(&mut out, &mut pending_dash, "and");
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' || c == '/' || c == '.' {
            pending_dash = true;
        }
    }

    out
}

fn push_word(out: &mut String, pending_dash: &mut bool, word: &str) {
    if !out.is_empty() {
        out.push('-');
    }
    *pending_dash = false;
    out.push_str(word);
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn ampersand_becomes_and() {
        assert_eq!(slugify("Home & Garden"), "home-and-garden");
        assert_eq!(slugify("Home&Garden"), "home-and-garden");
    }

    #[test]
    fn collapses_separators_and_drops_symbols() {
        assert_eq!(slugify("  Men's   T-Shirts!! "), "mens-t-shirts");
        assert_eq!(slugify("Kids__Toys / Games"), "kids-toys-games");
    }

    #[test]
    fn identical_names_give_identical_slugs() {
        assert_eq!(slugify("Electronics"), slugify("electronics"));
    }

    #[test]
    fn symbol_only_names_produce_empty_slug() {
        assert_eq!(slugify("!!!"), "");
    }
}
