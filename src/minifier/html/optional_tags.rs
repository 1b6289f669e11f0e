//! Optional end tags and elements without content.

use super::engine::HtmlRun;
use crate::markup::{AttributeType, Tag, TagFlags, optional};

/// Elements kept even when they enclose nothing.
fn keeps_when_empty(name: &str) -> bool {
    matches!(
        name,
        "html"
            | "head"
            | "body"
            | "title"
            | "script"
            | "style"
            | "textarea"
            | "iframe"
            | "object"
            | "video"
            | "audio"
            | "canvas"
            | "select"
            | "option"
            | "datalist"
            | "output"
            | "progress"
            | "meter"
            | "noscript"
            | "template"
            | "slot"
            | "tr"
            | "td"
            | "th"
            | "thead"
            | "tbody"
            | "tfoot"
            | "colgroup"
    )
}

/// Attributes that give an empty element a purpose of its own.
fn is_unremovable_empty_tag_attribute(name: &str, attr_type: AttributeType) -> bool {
    attr_type == AttributeType::Event
        || matches!(
            name,
            "id" | "class" | "name" | "role" | "style" | "itemprop" | "itemscope" | "itemtype"
        )
        || name.starts_with("data-")
        || name.starts_with("aria-")
        || name.starts_with("ng-")
}

/// `<tag></tag>` may disappear entirely.
pub(super) fn can_remove_without_content(tag: &Tag) -> bool {
    !tag.has_flags(TagFlags::EMPTY | TagFlags::XML)
        && !tag.is_custom_element()
        && !keeps_when_empty(&tag.name_in_lowercase)
        && !tag
            .attributes
            .iter()
            .any(|a| is_unremovable_empty_tag_attribute(&a.name_in_lowercase, a.attr_type))
}

impl HtmlRun<'_> {
    fn may_remove_end_tag(&self, name: &str) -> bool {
        self.settings.remove_optional_end_tags
            && !self.is_xhtml()
            && !self.minifier.preservable_optional_tags.contains(name)
    }

    /// End tag of `name` followed by the start tag `next`.
    pub(super) fn can_remove_end_tag_before(&self, name: &str, next: &str) -> bool {
        self.may_remove_end_tag(name) && optional::omissible_before(name, next)
    }

    /// End tag of `name` followed by the end tag of its parent.
    pub(super) fn can_remove_end_tag_in(&self, name: &str, parent: &str) -> bool {
        self.may_remove_end_tag(name) && optional::omissible_in(name, parent)
    }

    pub(super) fn can_remove_end_tag_at_document_end(&self, name: &str) -> bool {
        self.may_remove_end_tag(name) && optional::is_safe_optional_end_tag(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Attribute, Attributes};

    fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag {
        let attributes: Attributes = attrs
            .iter()
            .map(|(n, v)| Attribute::new(name, *n, Some((*v).to_owned())))
            .collect();
        Tag::new(name, attributes, false)
    }

    #[test]
    fn test_can_remove_without_content() {
        assert!(can_remove_without_content(&tag("div", &[])));
        assert!(can_remove_without_content(&tag("p", &[("title", "x")])));
        assert!(!can_remove_without_content(&tag("div", &[("id", "app")])));
        assert!(!can_remove_without_content(&tag("i", &[("class", "icon")])));
        assert!(!can_remove_without_content(&tag("span", &[("onclick", "go()")])));
        assert!(!can_remove_without_content(&tag("td", &[])));
        assert!(!can_remove_without_content(&tag("my-widget", &[])));
        assert!(!can_remove_without_content(&tag("svg", &[])));
    }
}
