pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/wrapper.html");

pub const CODE_MARKER: &str = "##code##";

/// Substitutes every `##code##` marker. The code is inserted verbatim; `$` sequences
/// carry no meaning here.
pub fn render_template(template: &str, code: &str) -> String {
    template.split(CODE_MARKER).collect::<Vec<_>>().join(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_sequences_survive() {
        let out = render_template("<script>##code##</script>", "let s = \"$&$1$$\";");
        assert_eq!(out, "<script>let s = \"$&$1$$\";</script>");
    }

    #[test]
    fn every_marker_is_replaced() {
        assert_eq!(render_template("##code##|##code##", "x"), "x|x");
        assert_eq!(render_template("no marker", "x"), "no marker");
    }

    #[test]
    fn default_template_has_a_marker() {
        assert_eq!(DEFAULT_TEMPLATE.matches(CODE_MARKER).count(), 1);
        assert!(DEFAULT_TEMPLATE.contains("runtime.js"));
    }
}
