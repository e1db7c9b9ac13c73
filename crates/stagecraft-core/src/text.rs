//! Display-name helpers.

/// Capitalise the first character of every whitespace-delimited word and
/// lower-case the rest. Whitespace and non-alphabetic characters are kept as
/// they are, so `"hello-world"` becomes `"Hello-world"`.
pub fn to_title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut word_start = true;
    for c in input.chars() {
        if c.is_whitespace() {
            out.push(c);
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
