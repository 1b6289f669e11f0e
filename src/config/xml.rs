//! `[xml]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[xml]` section in markmin.toml - generic XML minification options.
///
/// Also used for inline `<svg>` and `<math>` islands inside HTML.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct XmlSettings {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_whitespace: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_xml_comments: bool,

    /// `<a />` instead of `<a/>`.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub render_empty_tags_with_space: bool,

    /// Rewrite `<a></a>` as `<a/>`.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub collapse_tags_without_content: bool,

    /// Collapse whitespace runs containing a line break to `\n` instead of a space.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub preserve_new_lines: bool,
}
