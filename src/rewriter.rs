//! Reference rewriting after a rename pass.
//!
//! Each supported file kind has one textual substitution rule that prepends the
//! active prefix to the file names it references. Rules never touch a name that
//! already carries a known prefix, so running them twice is a no-op. A file is
//! written back only when its content actually changed.

use crate::policy::Policy;
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Manifest file name. Matched as a suffix so a prefixed manifest still counts.
pub const MANIFEST_NAME: &str = "package.json";

/// Top-level manifest fields holding an entry-point path.
const ENTRY_FIELDS: &[&str] = &["main", "types", "typings", "module", "browser"];

static PY_FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*from[ \t]+)([A-Za-z_]\w*)([ \t]+import\b)").expect("valid regex")
});

static PY_BARE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*import[ \t]+)([A-Za-z_]\w*)([ \t]*\r?)$").expect("valid regex")
});

// Groups: lead, open quote, directories, final segment, close quote (+ tail).
static JS_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\bfrom\s*)(["'])\./((?:[\w\-]+/)*)([\w\-][\w\-.]*)(["'])"#)
        .expect("valid regex")
});

static JS_REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\brequire\(\s*)(["'])\./((?:[\w\-]+/)*)([\w\-][\w\-.]*)(["']\s*\))"#)
        .expect("valid regex")
});

// Groups: label, directories, final segment, optional anchor + closing paren.
static MD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(\./((?:[\w\-]+/)*)([\w\-][\w\-.]*)((?:#[^)\s]*)?\))")
        .expect("valid regex")
});

static SCRIPT_FILE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\-]+\.(?:jsx|tsx|js|ts|py)").expect("valid regex"));

/// The file formats whose references get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Python-style `import x` / `from x import y`.
    Script,
    /// JavaScript/TypeScript relative `from "./x"` and `require("./x")`.
    Web,
    /// `package.json`.
    Manifest,
    /// Markdown `[label](./x)` links.
    Markup,
}

impl FileKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(MANIFEST_NAME) {
            return Some(Self::Manifest);
        }
        match path.extension()?.to_str()? {
            "py" => Some(Self::Script),
            "js" | "ts" | "jsx" | "tsx" => Some(Self::Web),
            "md" => Some(Self::Markup),
            _ => None,
        }
    }
}

/// Rewrites references in `path` in place.
///
/// Returns `Ok(true)` if the file was modified. Files of an unknown kind are
/// not read at all. Read, decode and write failures are returned as errors.
pub fn rewrite(path: &Path, policy: &Policy) -> Result<bool> {
    let Some(kind) = FileKind::detect(path) else {
        return Ok(false);
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let updated = rewrite_content(kind, &content, policy);
    if updated == content {
        return Ok(false);
    }

    fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Applies the rule for `kind` to `content`, returning the new text.
pub fn rewrite_content(kind: FileKind, content: &str, policy: &Policy) -> String {
    match kind {
        FileKind::Script => rewrite_script_imports(content, policy),
        FileKind::Web => rewrite_web_imports(content, policy),
        FileKind::Manifest => rewrite_manifest(content, policy),
        FileKind::Markup => rewrite_markup_links(content, policy),
    }
}

/// Prefixes module names in `from x import` and bare `import x` lines.
///
/// Both forms are anchored at the start of a line (indentation allowed). A
/// bare import must name exactly one module; `import a, b` and `import a as b`
/// are left alone.
pub fn rewrite_script_imports(content: &str, policy: &Policy) -> String {
    let prefix_module = |caps: &Captures| {
        let module = &caps[2];
        if policy.is_prefixed(module) {
            caps[0].to_string()
        } else {
            format!("{}{}{}{}", &caps[1], policy.prefix, module, &caps[3])
        }
    };

    let content = PY_FROM_IMPORT.replace_all(content, prefix_module);
    PY_BARE_IMPORT
        .replace_all(&content, prefix_module)
        .into_owned()
}

/// Prefixes the file name of relative `from "./..."` and `require("./...")`
/// specifiers, keeping directories, extension and quote style.
pub fn rewrite_web_imports(content: &str, policy: &Policy) -> String {
    let prefix_specifier = |caps: &Captures| {
        let (open, segment, close) = (&caps[2], &caps[4], &caps[5]);
        if !close.starts_with(open) || policy.is_prefixed(segment) {
            return caps[0].to_string();
        }
        format!(
            "{}{}./{}{}{}{}",
            &caps[1], open, &caps[3], policy.prefix, segment, close
        )
    };

    let content = JS_FROM.replace_all(content, prefix_specifier);
    JS_REQUIRE
        .replace_all(&content, prefix_specifier)
        .into_owned()
}

/// Prefixes the file name of relative `[label](./path)` links.
pub fn rewrite_markup_links(content: &str, policy: &Policy) -> String {
    MD_LINK
        .replace_all(content, |caps: &Captures| {
            let segment = &caps[3];
            if policy.is_prefixed(segment) {
                return caps[0].to_string();
            }
            format!(
                "[{}](./{}{}{}{}",
                &caps[1], &caps[2], policy.prefix, segment, &caps[4]
            )
        })
        .into_owned()
}

/// Prefixes entry-point fields and script file arguments in a manifest.
///
/// Content that is not a JSON object is returned untouched. The document is
/// re-serialized with two-space indentation only when a value changed.
pub fn rewrite_manifest(content: &str, policy: &Policy) -> String {
    let Ok(mut data) = serde_json::from_str::<Value>(content) else {
        return content.to_string();
    };
    let Some(fields) = data.as_object_mut() else {
        return content.to_string();
    };

    let mut changed = false;

    for key in ENTRY_FIELDS {
        if let Some(Value::String(entry)) = fields.get_mut(*key)
            && let Some(prefixed) = prefix_entry_path(entry, policy)
        {
            *entry = prefixed;
            changed = true;
        }
    }

    if let Some(Value::Object(scripts)) = fields.get_mut("scripts") {
        for command in scripts.values_mut() {
            if let Value::String(command) = command {
                let rewritten = rewrite_script_command(command, policy);
                if rewritten != *command {
                    *command = rewritten;
                    changed = true;
                }
            }
        }
    }

    if !changed {
        return content.to_string();
    }

    match serde_json::to_string_pretty(&data) {
        Ok(mut out) => {
            if content.ends_with('\n') {
                out.push('\n');
            }
            out
        }
        Err(_) => content.to_string(),
    }
}

/// Prefixes the last segment of a manifest path such as `./lib/index.js`.
/// Returns `None` when nothing should change.
fn prefix_entry_path(entry: &str, policy: &Policy) -> Option<String> {
    let (dir, file) = match entry.rfind('/') {
        Some(i) => entry.split_at(i + 1),
        None => ("", entry),
    };
    if file.is_empty() || policy.is_prefixed(file) {
        return None;
    }
    Some(format!("{}{}{}", dir, policy.prefix, file))
}

/// Prefixes whitespace-delimited `name.ext` tokens in a script command.
fn rewrite_script_command(command: &str, policy: &Policy) -> String {
    let mut out = String::with_capacity(command.len());
    let mut last = 0;

    for m in SCRIPT_FILE_TOKEN.find_iter(command) {
        let starts_token = command[..m.start()]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        let ends_token = command[m.end()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);

        if starts_token && ends_token && !policy.is_prefixed(m.as_str()) {
            out.push_str(&command[last..m.start()]);
            out.push_str(&policy.prefix);
            out.push_str(m.as_str());
            last = m.end();
        }
    }

    out.push_str(&command[last..]);
    out
}
