//! Output sanitization helpers.
//!
//! Device names are host-provided free text; Echo will render them verbatim
//! in its companion app, so every outbound field built from a name strips
//! HTML tags first.
/// Strips HTML tags from `input`, returning plain text.
///
/// Uses `html_escape`'s entity decoding plus a simple tag-stripping pass:
/// anything between `<` and `>` is removed wholesale rather than escaped,
/// since Echo only ever displays the name as plain text.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_tags() {
        assert_eq!(strip_html("<b>Kitchen</b> Light"), "Kitchen Light");
    }

    #[test]
    fn strips_script_tags_without_leaving_angle_brackets() {
        let cleaned = strip_html("<script>alert(1)</script>Lamp");
        assert!(!cleaned.contains('<'));
        assert!(!cleaned.contains('>'));
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(strip_html("Living Room"), "Living Room");
    }

    #[test]
    fn decodes_html_entities_after_stripping() {
        assert_eq!(strip_html("Tom &amp; Jerry"), "Tom & Jerry");
    }
}
