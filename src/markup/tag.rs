use smallvec::SmallVec;

use super::{Attribute, TagFlags, tag_flags};

pub type Attributes = SmallVec<[Attribute; 4]>;

/// One start or end tag occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub name_in_lowercase: String,
    pub attributes: Attributes,
    pub flags: TagFlags,
    /// Written with the `/>` syntax.
    pub self_closing: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>, attributes: Attributes, self_closing: bool) -> Self {
        let name = name.into();
        let name_in_lowercase = name.to_ascii_lowercase();
        let flags = tag_flags(&name_in_lowercase);
        Self {
            name,
            name_in_lowercase,
            attributes,
            flags,
            self_closing,
        }
    }

    /// End tags carry no attributes.
    pub fn end(name: impl Into<String>) -> Self {
        Self::new(name, Attributes::new(), false)
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name_in_lowercase == name
    }

    #[inline]
    pub const fn has_flags(&self, flags: TagFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name_in_lowercase == name)
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Value of the named attribute; `Some("")` for a valueless one.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(Attribute::value_str)
    }

    /// Custom elements (`my-widget`) carry a hyphen.
    #[inline]
    pub fn is_custom_element(&self) -> bool {
        self.name_in_lowercase.contains('-')
    }
}
