/// Clean HTML content of user comments using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags (like
/// <script>, <iframe>) and attributes (like onclick) are stripped together with
/// their content. Text made only of stripped markup comes back empty.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_but_keeps_formatting() {
        assert_eq!(clean_html("<b>great</b> product"), "<b>great</b> product");
        assert_eq!(clean_html("<script>alert(1)</script>"), "");
    }
}
