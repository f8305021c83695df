use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug fields
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "summer-sale", "shoes", "top-10-picks"
    /// - Invalid: "-sale", "sale-", "summer--sale", "Sale", "summer_sale"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}
