use std::sync::LazyLock;

use regex::Regex;

// Milan and its province: five digits starting with 2. Anything after the
// fifth digit is tolerated.
static POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^2\d{4}").expect("static regex"));

pub fn is_valid_postcode(postcode: &str) -> bool {
    POSTCODE.is_match(postcode)
}
