//! Directive attribute tokenizer.
//!
//! Parses the attribute text of a directive, `key=value key="a b" flag #id`,
//! into an ordered [`Attributes`] map using shell-style quoting.

/// Error raised by [`Attributes::try_parse`] when quoting is unbalanced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// A quote was opened but never closed.
    #[error("no closing {quote} quotation in `{text}`")]
    UnclosedQuote {
        /// The quote character that was left open.
        quote: char,
        /// The full attribute text.
        text: String,
    },
    /// The text ends with a bare escape character.
    #[error("no escaped character after trailing backslash in `{text}`")]
    TrailingEscape {
        /// The full attribute text.
        text: String,
    },
}

/// Ordered attribute map parsed from directive attribute text.
///
/// Values are `None` for bare flags (`cover`, `#my-id`). Keys are unique:
/// a repeated key keeps its first position and takes the last value.
///
/// # Example
///
/// ```
/// use porter_markup::Attributes;
///
/// let attrs = Attributes::parse(r#"key1=val1 key2="a b" flag1"#);
/// assert_eq!(attrs.value("key1"), Some("val1"));
/// assert_eq!(attrs.value("key2"), Some("a b"));
/// assert_eq!(attrs.get("flag1"), Some(None));
/// assert_eq!(attrs.get("missing"), None);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, Option<String>)>,
}

impl Attributes {
    /// Parse attribute text, falling back to a plain whitespace split when
    /// quoting is unbalanced.
    ///
    /// The fallback logs a single warning with the offending text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, |_| {})
    }

    /// Like [`parse`](Self::parse), calling `on_malformed` once before
    /// falling back.
    pub fn parse_with(text: &str, on_malformed: impl FnOnce(&TokenizeError)) -> Self {
        Self::try_parse(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed directive attributes, splitting on whitespace");
            on_malformed(&e);
            Self::parse_whitespace(text)
        })
    }

    /// Parse attribute text with shell-style quoting.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizeError`] when a quote is left open or the text ends
    /// with a dangling backslash.
    pub fn try_parse(text: &str) -> Result<Self, TokenizeError> {
        let mut attrs = Self::default();
        for word in split_words(text)? {
            attrs.push_word(&word);
        }
        Ok(attrs)
    }

    /// Parse attribute text by splitting on whitespace only.
    ///
    /// Quote characters are kept inside words; only the value's surrounding
    /// quotes are stripped.
    #[must_use]
    pub fn parse_whitespace(text: &str) -> Self {
        let mut attrs = Self::default();
        for word in text.split_whitespace() {
            attrs.push_word(word);
        }
        attrs
    }

    /// Insert a key, keeping the position of an existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a key.
    ///
    /// Returns `None` when the key is absent and `Some(None)` for a bare flag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Get the value of a key, treating bare flags as absent.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    /// Check whether a key is present, with or without a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Ids given with the `#id` shorthand, in source order.
    pub fn shorthand_ids(&self) -> impl Iterator<Item = &str> {
        self.keys().filter_map(|k| k.strip_prefix('#'))
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_word(&mut self, word: &str) {
        match word.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                let value = value.trim_matches(|c| c == '"' || c == '\'');
                self.insert(key, Some(value.to_owned()));
            }
            Some(_) => tracing::debug!(word, "Skipping attribute with empty key"),
            None if word.is_empty() => {}
            None => self.insert(word, None),
        }
    }
}

/// Split text into words with POSIX shell quoting.
///
/// Words break on ASCII space, tab, CR and LF only; other whitespace such
/// as a no-break space stays inside the word. Quotes may open mid-word and
/// are removed. A backslash escapes the next
/// character outside quotes; inside double quotes it only escapes `"` and `\`.
fn split_words(text: &str) -> Result<Vec<String>, TokenizeError> {
    let unclosed = |quote| TokenizeError::UnclosedQuote {
        quote,
        text: text.to_owned(),
    };

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\\' => {
                let escaped = chars.next().ok_or_else(|| TokenizeError::TrailingEscape {
                    text: text.to_owned(),
                })?;
                current.push(escaped);
                in_word = true;
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unclosed('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unclosed('"')),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unclosed('"')),
                    }
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
