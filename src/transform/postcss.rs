//! CSS post-processing: self-hosted `@font-face` injection, vendor
//! prefixing and media query consolidation.
//!
//! Runs on the expanded CSS produced by the SCSS stage. Prefixing and
//! printing go through `lightningcss`, which only prefixes as part of its
//! minify pass. The printed output keeps one declaration per line, but
//! values come out normalized (`blue` → `#00f`) and adjacent identical
//! rules are merged.
//!
//! Parsing recovers from invalid rules and declarations. Legacy hacks such
//! as `*zoom: 1` are dropped with a log line instead of failing the file.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};

use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use regex::Regex;

use crate::config::{FontConfig, parse_browser_version};
use crate::pipeline::BuildError;

// ============================================================================
// Targets
// ============================================================================

/// Map configured `browser = "version"` pairs onto lightningcss targets.
///
/// Unknown browsers and bad versions are rejected at config load, so they
/// are simply ignored here.
pub fn browsers_from_targets<'a>(
    targets: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> Browsers {
    let mut browsers = Browsers::default();
    for (name, version) in targets {
        let Some(version) = parse_browser_version(version) else {
            continue;
        };
        let slot = match name.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            _ => continue,
        };
        *slot = Some(version);
    }
    browsers
}

// ============================================================================
// Fonts
// ============================================================================

static FONT_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-family\s*:\s*([^;}]+)").unwrap());

static FONT_FACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)@font-face\s*\{[^}]*?font-family\s*:\s*([^;}]+)").unwrap());

/// Prepend `@font-face` rules for configured families that `css` uses in a
/// `font-family` declaration but never declares itself.
pub fn inject_font_faces(css: &str, fonts: &[FontConfig]) -> String {
    if fonts.is_empty() {
        return css.to_string();
    }

    let declared: BTreeSet<String> = FONT_FACE
        .captures_iter(css)
        .flat_map(|caps| family_names(&caps[1]))
        .collect();
    let used: BTreeSet<String> = FONT_FAMILY
        .captures_iter(css)
        .flat_map(|caps| family_names(&caps[1]))
        .collect();

    let mut faces = String::new();
    for font in fonts {
        let key = font.family.to_ascii_lowercase();
        if used.contains(&key) && !declared.contains(&key) {
            write_font_faces(&mut faces, font);
        }
    }

    if faces.is_empty() {
        css.to_string()
    } else {
        faces + css
    }
}

/// Lowercased, unquoted family names of a `font-family` value.
fn family_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn write_font_faces(out: &mut String, font: &FontConfig) {
    let slug = font.family.to_ascii_lowercase().replace(' ', "-");
    let base = font.url.trim_end_matches('/');

    for (variant, formats) in &font.variants {
        let mut weight = "400";
        let mut style = "normal";
        for part in variant.split_whitespace() {
            if part.chars().all(|c| c.is_ascii_digit()) {
                weight = part;
            } else {
                style = part;
            }
        }

        let suffix = if style == "normal" {
            weight.to_string()
        } else {
            format!("{weight}-{style}")
        };
        let sources: Vec<String> = formats
            .iter()
            .map(|ext| {
                let ext = ext.trim();
                format!(
                    "url(\"{base}/{slug}-{suffix}.{ext}\") format(\"{}\")",
                    font_format(ext)
                )
            })
            .collect();
        if sources.is_empty() {
            continue;
        }

        let _ = write!(
            out,
            "@font-face {{\n  font-family: \"{}\";\n  font-style: {style};\n  font-weight: {weight};\n  font-display: {};\n  src: {};\n}}\n",
            font.family,
            font.display,
            sources.join(", ")
        );
    }
}

fn font_format(ext: &str) -> &str {
    match ext {
        "eot" => "embedded-opentype",
        "ttf" => "truetype",
        "otf" => "opentype",
        "svg" => "svg",
        other => other,
    }
}

// ============================================================================
// Prefixing + media consolidation
// ============================================================================

/// Prefix for `browsers`, merge identical `@media` blocks and move them to
/// the end in desktop-first order.
pub fn process_css(path: &Path, css: &str, browsers: Browsers) -> Result<String, BuildError> {
    let mut stylesheet =
        parse_recovering(path, css).map_err(|err| BuildError::syntax(path, err))?;

    consolidate_media(&mut stylesheet.rules.0);

    let targets = Targets::from(browsers);
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|err| BuildError::tool("prefix", path, err.to_string()))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: false,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|err| BuildError::tool("prefix", path, err.to_string()))?;

    Ok(result.code)
}

/// Parse `css`, skipping invalid rules and declarations.
///
/// Every skipped construct is logged with its location.
pub(super) fn parse_recovering<'i>(path: &Path, css: &'i str) -> Result<StyleSheet<'i>, String> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        filename: path.display().to_string(),
        error_recovery: true,
        warnings: Some(Arc::clone(&warnings)),
        ..ParserOptions::default()
    };
    let stylesheet = StyleSheet::parse(css, options).map_err(|err| err.to_string())?;

    if let Ok(warnings) = warnings.read() {
        for warning in warnings.iter() {
            crate::log!("styles"; "ignored invalid css: {}", warning);
        }
    }
    Ok(stylesheet)
}

/// Merge top-level `@media` rules with identical queries and move them after
/// all other rules.
fn consolidate_media(rules: &mut Vec<CssRule<'_>>) {
    let mut plain = Vec::with_capacity(rules.len());
    let mut groups: Vec<(String, MediaRule<'_>)> = Vec::new();

    for rule in rules.drain(..) {
        let CssRule::Media(media) = rule else {
            plain.push(rule);
            continue;
        };
        let Ok(query) = media.query.to_css_string(PrinterOptions::default()) else {
            plain.push(CssRule::Media(media));
            continue;
        };
        match groups.iter().position(|(key, _)| *key == query) {
            Some(index) => groups[index].1.rules.0.extend(media.rules.0),
            None => groups.push((query, media)),
        }
    }

    groups.sort_by(|(a, _), (b, _)| compare_queries(a, b));
    plain.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
    *rules = plain;
}

static MAX_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:max-width\s*:\s*|width\s*<=?\s*)([\d.]+)(px|em|rem)?").unwrap()
});

static MIN_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:min-width\s*:\s*|width\s*>=?\s*)([\d.]+)(px|em|rem)?").unwrap()
});

/// Width bound of a media query in px.
fn width_bound(re: &Regex, query: &str) -> Option<f64> {
    let caps = re.captures(query)?;
    let value: f64 = caps[1].parse().ok()?;
    let scale = match caps.get(2).map(|unit| unit.as_str()) {
        Some("em" | "rem") => 16.0,
        _ => 1.0,
    };
    Some(value * scale)
}

/// Desktop-first: `max-width` descending, then `min-width` ascending, then
/// everything else. Ties keep their first-seen order.
fn compare_queries(a: &str, b: &str) -> Ordering {
    fn rank(query: &str) -> (u8, f64) {
        if let Some(max) = width_bound(&MAX_WIDTH, query) {
            (0, -max)
        } else if let Some(min) = width_bound(&MIN_WIDTH, query) {
            (1, min)
        } else {
            (2, 0.0)
        }
    }
    let (ra, va) = rank(a);
    let (rb, vb) = rank(b);
    ra.cmp(&rb).then(va.total_cmp(&vb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("`{needle}` not in:\n{haystack}"))
    }

    #[test]
    fn test_browsers_from_targets() {
        let mut targets = BTreeMap::new();
        targets.insert("safari".to_string(), "13.1".to_string());
        targets.insert("chrome".to_string(), "80".to_string());
        let browsers = browsers_from_targets(&targets);
        assert_eq!(browsers.safari, Some((13 << 16) | (1 << 8)));
        assert_eq!(browsers.chrome, Some(80 << 16));
        assert_eq!(browsers.firefox, None);
    }

    #[test]
    fn test_font_face_injected_when_used() {
        let css = "body {\n  font-family: \"Montserrat\", sans-serif;\n}\n";
        let out = inject_font_faces(css, &[FontConfig::montserrat()]);
        assert!(out.ends_with(css));
        assert!(out.contains("font-weight: 300;"));
        assert!(out.contains(
            "url(\"/fonts/montserrat-300.woff2\") format(\"woff2\"), url(\"/fonts/montserrat-300.woff\") format(\"woff\"), url(\"/fonts/montserrat-300.eot\") format(\"embedded-opentype\")"
        ));
        assert!(out.contains("font-style: italic;"));
        assert!(out.contains("url(\"/fonts/montserrat-400-italic.woff2\")"));
        assert!(out.contains("font-display: swap;"));
    }

    #[test]
    fn test_font_face_skipped_when_unused_or_declared() {
        let fonts = [FontConfig::montserrat()];
        let unused = "body { font-family: Arial; }";
        assert_eq!(inject_font_faces(unused, &fonts), unused);

        let declared = "@font-face { font-family: 'Montserrat'; src: url(/m.woff2); }\nbody { font-family: Montserrat; }";
        assert_eq!(inject_font_faces(declared, &fonts), declared);
    }

    #[test]
    fn test_vendor_prefixes() {
        let browsers = Browsers {
            safari: Some(13 << 16),
            ..Browsers::default()
        };
        let out = process_css(Path::new("a.css"), ".a { user-select: none; }", browsers).unwrap();
        assert!(out.contains("-webkit-user-select: none"), "{out}");
    }

    #[test]
    fn test_media_consolidated_desktop_first() {
        let css = "\
.a { margin: 1px; }
@media (max-width: 600px) { .a { margin: 2px; } }
@media (min-width: 900px) { .b { margin: 3px; } }
.c { margin: 4px; }
@media (max-width: 1000px) { .c { margin: 5px; } }
@media (max-width: 600px) { .d { margin: 6px; } }
@media print { .e { margin: 7px; } }
@media (min-width: 480px) { .f { margin: 8px; } }
";
        let out = process_css(Path::new("a.css"), css, Browsers::default()).unwrap();

        assert_eq!(out.matches("max-width: 600px").count(), 1, "{out}");
        let first_media = position(&out, "@media");
        assert!(position(&out, ".c {") < first_media);

        let order = [
            "max-width: 1000px",
            "max-width: 600px",
            "min-width: 480px",
            "min-width: 900px",
            "@media print",
        ];
        let positions: Vec<usize> = order.iter().map(|q| position(&out, q)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");

        let merged = position(&out, "max-width: 600px");
        assert!(position(&out, ".d {") > merged && position(&out, ".a {\n    margin") > merged);
    }

    #[test]
    fn test_legacy_hack_is_dropped() {
        let css = ".a { color: red; *zoom: 1; }\n.b { margin: 0; }\n";
        let out = process_css(Path::new("a.css"), css, Browsers::default()).unwrap();
        assert!(!out.contains("zoom"), "{out}");
        assert!(out.contains(".b {"), "{out}");
    }

    #[test]
    fn test_output_stays_expanded() {
        let css = ".a { color: blue; margin: 0; }";
        let out = process_css(Path::new("a.css"), css, Browsers::default()).unwrap();
        assert!(out.contains(".a {\n  color: #00f;\n  margin: 0;\n}"), "{out}");
    }

    #[test]
    fn test_compare_units() {
        assert_eq!(
            compare_queries("(max-width: 40em)", "(max-width: 600px)"),
            Ordering::Less
        );
        assert_eq!(
            compare_queries("(width <= 300px)", "(min-width: 100px)"),
            Ordering::Less
        );
    }
}
