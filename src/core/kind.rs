//! Asset kinds handled by the pipelines.

use std::fmt;

/// The fixed set of asset kinds, one pipeline each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Markup,
    Styles,
    Scripts,
    Images,
}

impl AssetKind {
    /// All kinds, in the order their pipelines are started.
    pub const ALL: [Self; 4] = [Self::Styles, Self::Markup, Self::Scripts, Self::Images];

    /// Stable lowercase name, used as the task name in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
        }
    }

    /// Extension of the written artifact, if it differs from the source.
    ///
    /// `None` keeps the source extension (images, markup).
    pub const fn output_ext(self) -> Option<&'static str> {
        match self {
            Self::Styles => Some("css"),
            Self::Scripts => Some("js"),
            Self::Markup | Self::Images => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = AssetKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AssetKind::ALL.len());
    }

    #[test]
    fn test_output_ext() {
        assert_eq!(AssetKind::Styles.output_ext(), Some("css"));
        assert_eq!(AssetKind::Markup.output_ext(), None);
    }
}
