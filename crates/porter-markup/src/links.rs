//! Root-relative link rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[text](/path)`, excluding protocol-relative `//host` targets.
static ROOT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(\s*/([^/)\s][^)\s]*)\s*\)").expect("invalid root link regex")
});

/// Prefix root-relative markdown link targets with `{{ site.baseurl }}`.
///
/// # Example
///
/// ```
/// use porter_markup::rewrite_root_links;
///
/// assert_eq!(
///     rewrite_root_links("See [tea](/essays/tea)."),
///     "See [tea]({{ site.baseurl }}/essays/tea)."
/// );
/// ```
#[must_use]
pub fn rewrite_root_links(text: &str) -> String {
    ROOT_LINK
        .replace_all(text, |caps: &Captures<'_>| {
            format!("[{}]({{{{ site.baseurl }}}}/{})", &caps[1], &caps[2])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_links_untouched() {
        let text = "[a](b/c) [d](https://example.com/x) [e](//cdn.example.com/x)";
        assert_eq!(rewrite_root_links(text), text);
    }

    #[test]
    fn test_multiple_links() {
        assert_eq!(
            rewrite_root_links("[a](/x) and [b]( /y/z )"),
            "[a]({{ site.baseurl }}/x) and [b]({{ site.baseurl }}/y/z)"
        );
    }

    #[test]
    fn test_rewrite_is_stable() {
        let once = rewrite_root_links("[a](/x)");
        assert_eq!(rewrite_root_links(&once), once);
    }
}
