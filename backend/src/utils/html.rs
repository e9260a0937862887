use ammonia;

/// Clean author-supplied HTML using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags
/// (like <script>, <iframe>) and attributes (like onclick) are stripped.
/// Question text is rendered as rich text by the exam client, so it is
/// cleaned before it is stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Cleans an optional field, keeping `None` as is.
pub fn clean_opt(input: Option<&str>) -> Option<String> {
    input.map(clean_html)
}
