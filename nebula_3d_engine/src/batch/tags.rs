/// Pass tag filters.
///
/// Shader passes carry string tags such as `LightMode=ShadowCaster` or
/// `RenderOrder=Transparent`. A filter decides which passes of a material
/// take part in a batch build.

use crate::resource::ShaderPass;

/// Predicate over a shader pass's tags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    /// Every pass
    #[default]
    Any,
    /// Tag `key` equals `value`; passes without the tag match if `match_untagged`
    Equals {
        key: String,
        value: String,
        match_untagged: bool,
    },
    /// Tag `key` is absent or differs from `value`
    NotEquals { key: String, value: String },
    /// Every inner filter matches
    All(Vec<TagFilter>),
}

impl TagFilter {
    pub fn any() -> Self {
        TagFilter::Any
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagFilter::Equals {
            key: key.into(),
            value: value.into(),
            match_untagged: false,
        }
    }

    pub fn not_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagFilter::NotEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Also accept passes that do not declare the tag (no-op on other variants)
    pub fn or_untagged(self) -> Self {
        match self {
            TagFilter::Equals { key, value, .. } => TagFilter::Equals { key, value, match_untagged: true },
            other => other,
        }
    }

    /// Conjunction, flattening nested `All`
    pub fn and(self, other: TagFilter) -> Self {
        let mut filters = match self {
            TagFilter::All(filters) => filters,
            TagFilter::Any => return other,
            single => vec![single],
        };
        match other {
            TagFilter::All(more) => filters.extend(more),
            TagFilter::Any => {}
            single => filters.push(single),
        }
        TagFilter::All(filters)
    }

    pub fn matches(&self, pass: &ShaderPass) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Equals { key, value, match_untagged } => match pass.tag(key) {
                Some(tag) => tag == value,
                None => *match_untagged,
            },
            TagFilter::NotEquals { key, value } => pass.tag(key) != Some(value.as_str()),
            TagFilter::All(filters) => filters.iter().all(|f| f.matches(pass)),
        }
    }
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
