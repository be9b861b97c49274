//! YAML front matter for Porter documents.
//!
//! [`split`] separates a leading `---` delimited YAML block from the body.
//! [`FrontMatter`] keeps the parsed mapping in source key order and renders
//! it back as block-style YAML.
//!
//! YAML is parsed with serde_yaml, which follows the YAML 1.2 core schema:
//! date-shaped scalars such as `2021-03-04` stay plain strings and are written
//! back unchanged. Strings that YAML 1.1 readers take as booleans (`yes`,
//! `no`, `on`, `off`, `y`, `n`) are single-quoted on output.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

static FRONT_MATTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\x{FEFF}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
        .expect("invalid front matter regex")
});

/// A plain scalar after `key: ` or `- ` that YAML 1.1 reads as a boolean.
static YAML11_BOOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*(?:- )*(?:[^\s'\x22][^\n]*?: )?)((?i:y|yes|n|no|on|off))$")
        .expect("invalid yaml 1.1 boolean regex")
});

/// Line introducing a block scalar: `key: |-`, `- >`.
static BLOCK_SCALAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|: |- )[|>][+-]?[0-9]?$").expect("invalid block scalar regex")
});

/// Error type for front matter operations.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// The block is not valid YAML.
    #[error("Invalid YAML front matter: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The block is valid YAML but not a mapping.
    #[error("Front matter must be a mapping, found {0}")]
    NotMapping(&'static str),
    /// The mapping could not be written back as YAML.
    #[error("Failed to serialize front matter: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Parsed front matter mapping.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

/// Split a document into front matter and body.
///
/// A document without a leading `---` block yields empty front matter and the
/// text without its byte order mark.
///
/// # Errors
///
/// Returns an error if the block is malformed YAML or not a mapping.
///
/// # Example
///
/// ```
/// let (fm, body) = porter_frontmatter::split("---\ntitle: Tea\n---\nBody\n").unwrap();
/// assert_eq!(fm.get_str("title"), Some("Tea"));
/// assert_eq!(body, "Body\n");
/// ```
pub fn split(doc: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let Some(caps) = FRONT_MATTER_PATTERN.captures(doc) else {
        return Ok((FrontMatter::default(), doc.strip_prefix('\u{FEFF}').unwrap_or(doc)));
    };
    let yaml = caps.get(1).map_or("", |m| m.as_str());
    let end = caps.get(0).map_or(0, |m| m.end());
    Ok((FrontMatter::parse(yaml)?, &doc[end..]))
}

impl FrontMatter {
    /// Parse a YAML payload (without delimiters).
    ///
    /// Empty content returns empty front matter.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or is not a mapping.
    pub fn parse(yaml: &str) -> Result<Self, FrontMatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml::from_str(yaml)? {
            Value::Mapping(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(FrontMatterError::NotMapping(value_kind(&other))),
        }
    }

    /// Check if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Get a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a top-level string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Set a top-level field. An existing key keeps its position.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(Value::String(key.to_owned()), value.into());
    }

    /// Set a nested field, creating intermediate mappings.
    ///
    /// A non-mapping value on the path is replaced by a mapping.
    ///
    /// ```
    /// use porter_frontmatter::FrontMatter;
    ///
    /// let mut fm = FrontMatter::parse("image: old.jpg").unwrap();
    /// fm.insert_path(&["image", "path"], "new.jpg");
    /// assert_eq!(fm.to_yaml().unwrap(), "image:\n  path: new.jpg\n");
    /// ```
    pub fn insert_path(&mut self, path: &[&str], value: impl Into<Value>) {
        insert_path(&mut self.fields, path, value.into());
    }

    /// Serialize as block-style YAML without delimiters.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, FrontMatterError> {
        let yaml = serde_yaml::to_string(&self.fields).map_err(FrontMatterError::Serialize)?;
        Ok(quote_yaml11_booleans(&yaml))
    }

    /// Join front matter and body into a document.
    ///
    /// Empty front matter returns the body unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, body: &str) -> Result<String, FrontMatterError> {
        if self.is_empty() {
            return Ok(body.to_owned());
        }
        Ok(format!("---\n{}---\n{body}", self.to_yaml()?))
    }
}

fn insert_path(map: &mut Mapping, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let key = Value::String((*first).to_owned());
    if rest.is_empty() {
        map.insert(key, value);
        return;
    }
    if !map.get(&key).is_some_and(Value::is_mapping) {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(Value::Mapping(child)) = map.get_mut(&key) {
        insert_path(child, rest, value);
    }
}

/// Single-quote plain `yes`/`no`/`on`/`off`/`y`/`n` scalars.
///
/// serde_yaml never writes a real boolean this way, so such a scalar is
/// always a string. Block scalar content is left alone.
fn quote_yaml11_booleans(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    let mut block_indent: Option<usize> = None;
    for line in yaml.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        let indent = content.len() - content.trim_start_matches(' ').len();
        if let Some(outer) = block_indent {
            if content.trim().is_empty() || indent > outer {
                out.push_str(line);
                continue;
            }
            block_indent = None;
        }
        if BLOCK_SCALAR.is_match(content) {
            block_indent = Some(indent);
        }
        match YAML11_BOOL.captures(content) {
            Some(caps) if !caps[1].is_empty() => {
                out.push_str(&format!("{}'{}'", &caps[1], &caps[2]));
                out.push_str(&line[content.len()..]);
            }
            _ => out.push_str(line),
        }
    }
    out
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
