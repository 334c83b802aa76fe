//! `@@include` directive resolution for markup and scripts.
//!
//! ```text
//! @@include('_header.html')
//! @@include('parts/_card.html', { "title": "Pricing", "count": 3 })
//! ```
//!
//! The path is relative to the including file. Inside the included fragment
//! `@@title` and `@@count` are replaced from the JSON context before the
//! fragment's own directives are resolved.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::pipeline::BuildError;

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)@@include\(\s*['"]([^'"]+)['"]\s*(?:,\s*(\{.*?\})\s*)?\)"#).unwrap()
});

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@@(\w+)").unwrap());

/// Resolve every include directive in `text`, which was read from `path`.
pub fn resolve_includes(path: &Path, text: &str) -> Result<String, BuildError> {
    let mut stack = vec![canonical(path)];
    expand(path, text, &mut stack)
}

fn expand(path: &Path, text: &str, stack: &mut Vec<PathBuf>) -> Result<String, BuildError> {
    if !text.contains("@@include") {
        return Ok(text.to_string());
    }

    let base = path.parent().unwrap_or(Path::new(""));
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INCLUDE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let target = base.join(&caps[1]);
        let context = match caps.get(2) {
            Some(raw) => parse_context(path, raw.as_str())?,
            None => Map::new(),
        };

        let key = canonical(&target);
        if stack.contains(&key) {
            return Err(BuildError::syntax(
                path,
                format!("include cycle through `{}`", target.display()),
            ));
        }

        let fragment = fs::read_to_string(&target).map_err(|err| BuildError::io(&target, err))?;
        let fragment = substitute(&fragment, &context);

        stack.push(key);
        let resolved = expand(&target, &fragment, stack)?;
        stack.pop();

        out.push_str(&resolved);
    }

    out.push_str(&text[last..]);
    Ok(out)
}

fn parse_context(path: &Path, raw: &str) -> Result<Map<String, Value>, BuildError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BuildError::syntax(path, "include context must be an object")),
        Err(err) => Err(BuildError::syntax(
            path,
            format!("invalid include context: {err}"),
        )),
    }
}

/// Replace `@@key` tokens with context values. Unknown keys stay as written.
fn substitute(fragment: &str, context: &Map<String, Value>) -> String {
    if context.is_empty() {
        return fragment.to_string();
    }
    VARIABLE
        .replace_all(fragment, |caps: &Captures<'_>| match context.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Identity of a file for cycle detection. Missing files keep their joined path.
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
