// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge and label markup builders.
//!
//! Every builder is a pure function of its inputs and the injected
//! [`BadgeTheme`]. Output is an HTML fragment with all caller-supplied text
//! escaped, so fragments can be embedded verbatim in a rendered page.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Styling category signalling a status at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    /// Positive state such as an exact qualification or synced branches.
    Emerald,
    /// Neutral, historical information.
    Slate,
    /// Informational counts and tags.
    Sky,
    /// Attention needed but not broken.
    Amber,
    /// Data that could not be retrieved.
    Rose
}

impl BadgeVariant {
    /// Lowercase variant name used in CSS class names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emerald => "emerald",
            Self::Slate => "slate",
            Self::Sky => "sky",
            Self::Amber => "amber",
            Self::Rose => "rose"
        }
    }
}

/// Theme injected into the builders; controls CSS class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeTheme {
    class_prefix: Cow<'static, str>
}

impl Default for BadgeTheme {
    fn default() -> Self {
        Self {
            class_prefix: Cow::Borrowed("badge")
        }
    }
}

impl BadgeTheme {
    /// Creates a theme emitting classes such as `{prefix}` and
    /// `{prefix}-emerald`.
    pub fn new<P>(class_prefix: P) -> Self
    where
        P: Into<Cow<'static, str>>
    {
        Self {
            class_prefix: class_prefix.into()
        }
    }

    /// Class prefix applied to every fragment.
    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }
}

/// Builder for a single styled label.
///
/// # Examples
///
/// ```
/// use statboard::{Badge, BadgeTheme, BadgeVariant};
///
/// let html = Badge::new(BadgeVariant::Sky, "v1.0.0")
///     .tooltip("Released 2026-03-15")
///     .link("https://github.com/o/r/releases/tag/v1.0.0")
///     .render(&BadgeTheme::default());
/// assert_eq!(
///     html,
///     "<a href=\"https://github.com/o/r/releases/tag/v1.0.0\" title=\"Released 2026-03-15\"><span class=\"badge badge-sky\">v1.0.0</span></a>"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Badge<'a> {
    variant:  BadgeVariant,
    text:     &'a str,
    tooltip:  Option<&'a str>,
    href:     Option<&'a str>,
    progress: Option<u8>
}

impl<'a> Badge<'a> {
    /// Starts a badge with the given style and visible text.
    pub fn new(variant: BadgeVariant, text: &'a str) -> Self {
        Self {
            variant,
            text,
            tooltip: None,
            href: None,
            progress: None
        }
    }

    /// Sets the hover text.
    pub fn tooltip(mut self, tooltip: &'a str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    /// Wraps the badge in a link.
    pub fn link(mut self, href: &'a str) -> Self {
        self.href = Some(href);
        self
    }

    /// Renders the badge as a progress bar filled to `percent` (clamped to
    /// 100).
    pub fn progress(mut self, percent: u8) -> Self {
        self.progress = Some(percent.min(100));
        self
    }

    /// Produces the HTML fragment.
    pub fn render(self, theme: &BadgeTheme) -> String {
        let prefix = theme.class_prefix();
        let variant = self.variant.as_str();
        let text = escape_html(self.text);
        let mut buffer = String::with_capacity(96 + self.text.len());

        let title = self
            .tooltip
            .map(|tooltip| format!(" title=\"{}\"", escape_html(tooltip)))
            .unwrap_or_default();

        let inner = match self.progress {
            Some(percent) => format!(
                "<span class=\"{prefix} {prefix}-progress {prefix}-{variant}\" style=\"--fill: {percent}%\">{text}</span>"
            ),
            None => format!("<span class=\"{prefix} {prefix}-{variant}\">{text}</span>")
        };

        match self.href {
            Some(href) => {
                buffer.push_str(&format!("<a href=\"{}\"{title}>{inner}</a>", escape_html(href)))
            }
            None if title.is_empty() => buffer.push_str(&inner),
            None => buffer.push_str(&format!("<span{title}>{inner}</span>"))
        }

        buffer
    }
}

/// Renders a plain hyperlink.
pub fn link(text: &str, href: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(href), escape_html(text))
}

/// Escapes the characters HTML treats specially.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len() + 8);
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
