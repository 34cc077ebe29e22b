//! Prompt composition from named fragments.
//!
//! A prompt is an ordered list of fragments joined by blank lines. Optional
//! fragments render zero or one block: a section whose value is absent (or
//! blank) is left out entirely, heading included, so the model is never asked
//! to elaborate on an empty placeholder.

#[derive(Debug, Clone)]
enum Fragment {
    Text(String),
    Block { heading: String, body: String },
    Optional { heading: String, body: Option<String> },
}

impl Fragment {
    fn render(&self) -> Option<String> {
        match self {
            Fragment::Text(text) => Some(text.clone()),
            Fragment::Block { heading, body } => Some(format!("{}\n{}", heading, body)),
            Fragment::Optional { heading, body } => body
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(|b| format!("{}\n{}", heading, b)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptTemplate {
    fragments: Vec<Fragment>,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal text, rendered as-is.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Text(text.into()));
        self
    }

    /// A heading line followed by a required body.
    pub fn block(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Block {
            heading: heading.into(),
            body: body.into(),
        });
        self
    }

    /// A heading plus body that is only rendered when `body` has content.
    pub fn optional(mut self, heading: impl Into<String>, body: Option<&str>) -> Self {
        self.fragments.push(Fragment::Optional {
            heading: heading.into(),
            body: body.map(str::to_string),
        });
        self
    }

    /// Appends every fragment of `other`.
    pub fn append(mut self, other: PromptTemplate) -> Self {
        self.fragments.extend(other.fragments);
        self
    }

    /// True when rendering would produce no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.render().is_none())
    }

    pub fn render(&self) -> String {
        self.fragments
            .iter()
            .filter_map(Fragment::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Flattens items into `- item` lines.
pub fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
