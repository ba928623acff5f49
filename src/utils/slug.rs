//! URL slugification for tags and categories.
//!
//! Names are transliterated to ASCII, lowercased and dash-joined. The
//! config `[slugs]` table can pin an exact slug for names whose automatic
//! form is ugly or ambiguous (`"C++" = "cpp"`).

use deunicode::deunicode;
use std::collections::HashMap;

/// Slugify a display name, honoring configured overrides.
pub fn slugify_with(name: &str, overrides: &HashMap<String, String>) -> String {
    overrides
        .get(name)
        .cloned()
        .unwrap_or_else(|| slugify(name))
}

/// Transliterate to lowercase ASCII, turning every run of
/// non-alphanumeric characters into a single dash.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
