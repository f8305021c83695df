/// Normalize free text into a URL-safe slug.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single dash and trims leading/trailing dashes. Deterministic and
/// collision-prone by design: uniqueness is enforced by the store, not here.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}
