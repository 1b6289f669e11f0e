use super::{AttributeType, NodeCoordinates, attribute_type};

/// One attribute as written in the source.
///
/// `value` is the raw (still entity-encoded) text between the quotes, or `None`
/// for the valueless `<input disabled>` syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub name_in_lowercase: String,
    pub value: Option<String>,
    pub attr_type: AttributeType,
    pub name_coordinates: NodeCoordinates,
    pub value_coordinates: NodeCoordinates,
}

impl Attribute {
    /// Build an attribute of the tag named `tag_name` (lowercase), typing it
    /// from the metadata tables.
    pub fn new(tag_name: &str, name: impl Into<String>, value: Option<String>) -> Self {
        let name = name.into();
        let name_in_lowercase = name.to_ascii_lowercase();
        let attr_type = attribute_type(tag_name, &name_in_lowercase);
        Self {
            name,
            name_in_lowercase,
            value,
            attr_type,
            name_coordinates: NodeCoordinates::EMPTY,
            value_coordinates: NodeCoordinates::EMPTY,
        }
    }

    pub fn with_coordinates(mut self, name: NodeCoordinates, value: NodeCoordinates) -> Self {
        self.name_coordinates = name;
        self.value_coordinates = value;
        self
    }

    #[inline]
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Value text, empty when valueless.
    #[inline]
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Case-insensitive value comparison after trimming.
    pub fn value_eq_ignore_case(&self, expected: &str) -> bool {
        self.value_str().trim().eq_ignore_ascii_case(expected)
    }

    /// Coordinates to report problems inside the value against.
    pub fn diagnostic_coordinates(&self) -> NodeCoordinates {
        if self.value_coordinates.is_empty() {
            self.name_coordinates
        } else {
            self.value_coordinates
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_typing_uses_tag() {
        let href = Attribute::new("a", "HREF", Some("x.html".into()));
        assert_eq!(href.name_in_lowercase, "href");
        assert_eq!(href.attr_type, AttributeType::Uri);

        let href = Attribute::new("div", "href", Some("x.html".into()));
        assert_eq!(href.attr_type, AttributeType::Text);
    }

    #[test]
    fn test_valueless_attribute() {
        let attr = Attribute::new("input", "disabled", None);
        assert!(!attr.has_value());
        assert_eq!(attr.value_str(), "");
        assert_eq!(attr.attr_type, AttributeType::Boolean);
    }

    #[test]
    fn test_value_eq_ignore_case() {
        let attr = Attribute::new("form", "method", Some(" GET ".into()));
        assert!(attr.value_eq_ignore_case("get"));
        assert!(!attr.value_eq_ignore_case("post"));
    }
}
