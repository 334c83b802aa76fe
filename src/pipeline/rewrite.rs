//! Production asset-reference rewriter.
//!
//! Internal references such as `/js/main.js` are moved below the canonical
//! `/assets/` prefix in production output:
//!
//! | Kind    | Pattern                       | Example                                 |
//! |---------|-------------------------------|-----------------------------------------|
//! | markup  | `/(style\|lib\|js\|images)/`  | `/style/app.css` → `/assets/style/app.css` |
//! | styles  | `/(images)/`                  | `/images/bg.png` → `/assets/images/bg.png` |
//! | scripts | `/(\w+)/`                     | `/js/main.js` → `/assets/js/main.js`    |
//!
//! Rewriting is idempotent. A reference already below `/assets/` is copied
//! through unchanged, so a second pass never nests the prefix.

use std::sync::LazyLock;

use regex::Regex;

use super::{Asset, BuildError, Stage};
use crate::core::AssetKind;

/// Canonical segment every rewritten reference starts with.
const ASSETS: &str = "assets";

/// Pattern and replacement template for one asset kind.
#[derive(Debug)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            replacement: "/assets/$1/",
        }
    }

    /// Rule for `kind`, `None` for kinds that are never rewritten.
    pub fn for_kind(kind: AssetKind) -> Option<&'static Self> {
        static MARKUP: LazyLock<RewriteRule> =
            LazyLock::new(|| RewriteRule::new(r"/(style|lib|js|images)/"));
        static STYLES: LazyLock<RewriteRule> = LazyLock::new(|| RewriteRule::new(r"/(images)/"));
        static SCRIPTS: LazyLock<RewriteRule> = LazyLock::new(|| RewriteRule::new(r"/(\w+)/"));

        match kind {
            AssetKind::Markup => Some(&MARKUP),
            AssetKind::Styles => Some(&STYLES),
            AssetKind::Scripts => Some(&SCRIPTS),
            AssetKind::Images => None,
        }
    }

    #[cfg(test)]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replace every non-overlapping match, leaving `/assets/...` alone.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 64);
        let mut last = 0;
        let mut pos = 0;

        while let Some(caps) = self.pattern.captures_at(text, pos) {
            let Some(m) = caps.get(0) else { break };
            let segment = caps.get(1).map_or("", |c| c.as_str());

            if text[..m.start()].ends_with("/assets") {
                // `/assets/<segment>/`: already rewritten.
                pos = m.end();
                continue;
            }

            if segment == ASSETS {
                // The rewritten segment shares the slash that closes `/assets/`.
                pos = match self.pattern.find_at(text, m.end() - 1) {
                    Some(next) if next.start() == m.end() - 1 => next.end(),
                    _ => m.end(),
                };
                continue;
            }

            out.push_str(&text[last..m.start()]);
            caps.expand(self.replacement, &mut out);
            last = m.end();
            pos = m.end();
        }

        out.push_str(&text[last..]);
        out
    }
}

/// Rewrite internal references of `kind` below `/assets/`.
///
/// Kinds without a rule (images) are returned unchanged.
pub fn rewrite(kind: AssetKind, text: &str) -> String {
    match RewriteRule::for_kind(kind) {
        Some(rule) => rule.apply(text),
        None => text.to_string(),
    }
}

/// Stage form of [`rewrite`], appended in production only.
pub struct Rewrite(pub AssetKind);

impl Stage for Rewrite {
    fn name(&self) -> &'static str {
        "rewrite"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        asset.text = rewrite(self.0, &asset.text);
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twice(kind: AssetKind, text: &str) -> (String, String) {
        let once = rewrite(kind, text);
        let again = rewrite(kind, &once);
        (once, again)
    }

    #[test]
    fn test_script_reference() {
        let (once, again) = twice(AssetKind::Scripts, "import('/js/main.js')");
        assert_eq!(once, "import('/assets/js/main.js')");
        assert_eq!(again, once);
    }

    #[test]
    fn test_markup_references() {
        let html = r#"<link href="/style/app.css"><script src="/lib/imask.min.js"></script><img src="/images/a.png"><a href="/about/">x</a>"#;
        let (once, again) = twice(AssetKind::Markup, html);
        assert_eq!(
            once,
            r#"<link href="/assets/style/app.css"><script src="/assets/lib/imask.min.js"></script><img src="/assets/images/a.png"><a href="/about/">x</a>"#
        );
        assert_eq!(again, once);
    }

    #[test]
    fn test_style_references() {
        let css = "a { background: url(/images/bg.png) } b { background: url(/fonts/x.woff) }";
        let (once, again) = twice(AssetKind::Styles, css);
        assert_eq!(
            once,
            "a { background: url(/assets/images/bg.png) } b { background: url(/fonts/x.woff) }"
        );
        assert_eq!(again, once);
    }

    #[test]
    fn test_nested_script_segments() {
        // The trailing slash of the first match is consumed, so `b/` stays.
        let (once, again) = twice(AssetKind::Scripts, "'/a/b/c.js'");
        assert_eq!(once, "'/assets/a/b/c.js'");
        assert_eq!(again, once);
    }

    #[test]
    fn test_already_canonical() {
        for kind in [AssetKind::Markup, AssetKind::Styles, AssetKind::Scripts] {
            let text = "/assets/images/x.png /assets/js/y.js";
            assert_eq!(rewrite(kind, text), text);
        }
    }

    #[test]
    fn test_images_have_no_rule() {
        assert!(RewriteRule::for_kind(AssetKind::Images).is_none());
        assert_eq!(rewrite(AssetKind::Images, "/images/a.png"), "/images/a.png");
    }

    #[test]
    fn test_rewrite_stage() {
        let asset = Asset::new(
            "/site/app/index.html".into(),
            "index.html".into(),
            "<script src=\"/js/main.js\"></script>".into(),
        );
        let out = Rewrite(AssetKind::Markup).apply(asset).unwrap();
        assert_eq!(out.text, "<script src=\"/assets/js/main.js\"></script>");
    }

    #[test]
    fn test_patterns() {
        let markup = RewriteRule::for_kind(AssetKind::Markup).unwrap();
        assert_eq!(markup.pattern(), r"/(style|lib|js|images)/");
    }
}
