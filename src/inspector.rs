//! Shallow structural checks over the workspace markup.
//!
//! These are regex-level heuristics, not a parser: malformed markup never
//! fails, it just may go unnoticed.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::escalation::ReasonCategory;

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<img\b[^>]*>"));
static NON_EMPTY_ALT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?is)\balt\s*=\s*("[^"]*\S[^"]*"|'[^']*\S[^']*'|[^\s"'>]+)"#));
static INPUT_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<input\b[^>]*>"));
static INPUT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?is)\btype\s*=\s*["']?([a-z-]+)"#));
static VALIDATION_ATTR: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)\b(required|pattern)\b"));
static FORM_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<form\b[^>]*>"));
static POST_METHOD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?is)\bmethod\s*=\s*["']?post\b"#));
static PLAIN_HTTP_ACTION: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?is)\baction\s*=\s*["']?http://"#));

/// Input types that take free text and therefore need validation.
const TEXT_LIKE_INPUTS: &[&str] = &["text", "email", "tel", "url", "search", "number"];

// Patterns are literals above; a failure here is a programming error caught by tests.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid inspector pattern {pattern}: {err}"))
}

/// Result of inspecting the workspace text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Findings {
    /// Some `<img>` lacks a non-empty `alt` attribute.
    pub has_image_without_alt: bool,
    /// Some free-text `<input>` has neither `required` nor `pattern`.
    pub has_unvalidated_input: bool,
    /// No password input anywhere in the document.
    pub lacks_password_field: bool,
    /// A form submits without `method="post"` or to a plain `http://` action.
    pub has_insecure_form: bool,
}

impl Findings {
    /// Whether the finding for `category` is still open.
    ///
    /// Generic messages are never kept open by inspection.
    #[must_use]
    pub fn blocks(&self, category: ReasonCategory) -> bool {
        match category {
            ReasonCategory::Accessibility => self.has_image_without_alt,
            ReasonCategory::Validation => self.has_unvalidated_input,
            ReasonCategory::Authentication => self.lacks_password_field,
            ReasonCategory::Security => self.has_insecure_form,
            ReasonCategory::Generic => false,
        }
    }

    /// Categories with an open finding, in a stable order.
    #[must_use]
    pub fn open_categories(&self) -> Vec<ReasonCategory> {
        [
            ReasonCategory::Accessibility,
            ReasonCategory::Validation,
            ReasonCategory::Authentication,
            ReasonCategory::Security,
        ]
        .into_iter()
        .filter(|category| self.blocks(*category))
        .collect()
    }

    /// True when nothing is open.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.open_categories().is_empty()
    }
}

/// Inspect the workspace text.
#[must_use]
pub fn inspect(text: &str) -> Findings {
    Findings {
        has_image_without_alt: IMG_TAG
            .find_iter(text)
            .any(|tag| !NON_EMPTY_ALT.is_match(tag.as_str())),
        has_unvalidated_input: INPUT_TAG.find_iter(text).any(|tag| {
            let tag = tag.as_str();
            is_text_like(tag) && !VALIDATION_ATTR.is_match(tag)
        }),
        lacks_password_field: !INPUT_TAG
            .find_iter(text)
            .any(|tag| input_type(tag.as_str()) == "password"),
        has_insecure_form: FORM_TAG.find_iter(text).any(|tag| {
            let tag = tag.as_str();
            !POST_METHOD.is_match(tag) || PLAIN_HTTP_ACTION.is_match(tag)
        }),
    }
}

fn input_type(tag: &str) -> String {
    INPUT_TYPE
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| "text".to_owned(), |m| m.as_str().to_lowercase())
}

fn is_text_like(tag: &str) -> bool {
    TEXT_LIKE_INPUTS.contains(&input_type(tag).as_str())
}
