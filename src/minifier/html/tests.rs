use proptest::prelude::*;

use super::HtmlMinifier;
use crate::code::CrudeJsMinifier;
use crate::config::{AttributeQuotesRemovalMode, HtmlSettings, WhitespaceMinificationMode};
use crate::minifier::{ErrorCategory, MarkupMinifier};

fn minify(settings: HtmlSettings, source: &str) -> String {
    let result = HtmlMinifier::new(settings).minify(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    result.minified_content
}

fn minify_default(source: &str) -> String {
    minify(HtmlSettings::default(), source)
}

// ============================================================================
// Attributes and doctype
// ============================================================================

#[test]
fn test_boolean_attribute_collapses() {
    assert_eq!(minify_default(r#"<input disabled="disabled">"#), "<input disabled>");
}

#[test]
fn test_short_doctype() {
    let source = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#;
    assert_eq!(minify_default(source), "<!DOCTYPE html>");
}

#[test]
fn test_attribute_quotes() {
    assert_eq!(minify_default(r#"<a href="clock.html">"#), "<a href=clock.html>");

    let settings = HtmlSettings {
        attribute_quotes_removal_mode: AttributeQuotesRemovalMode::KeepQuotes,
        ..HtmlSettings::default()
    };
    assert_eq!(minify(settings, r#"<a href="clock.html">"#), r#"<a href="clock.html">"#);
}

#[test]
fn test_event_handler_is_minified() {
    let result = HtmlMinifier::default()
        .with_js_minifier(CrudeJsMinifier)
        .minify(r#"<button onclick="javascript: doIt( 1 );">Go</button>"#);
    assert_eq!(result.minified_content, "<button onclick=doIt(1)>Go</button>");
}

#[test]
fn test_xmlns_dropped_and_namespaced_attribute_warns() {
    let result = HtmlMinifier::default().minify(r#"<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en">"#);
    assert!(result.is_success());
    assert_eq!(result.minified_content, "<html xml:lang=en>");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].category, ErrorCategory::HtmlMinificationWarning);
}

#[test]
fn test_xml_declaration_removed_with_warning() {
    let result = HtmlMinifier::default().minify("<?xml version=\"1.0\"?>\n<p>x</p>");
    assert_eq!(result.minified_content, "<p>x</p>");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].line_number, 1);
}

// ============================================================================
// Elements
// ============================================================================

#[test]
fn test_remove_tags_without_content() {
    let settings = HtmlSettings {
        remove_tags_without_content: true,
        whitespace_minification_mode: WhitespaceMinificationMode::None,
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings, "<div>one<div>two <div>three</div><div></div>four</div>five</div>"),
        "<div>one<div>two <div>three</div>four</div>five</div>"
    );
}

#[test]
fn test_removed_element_does_not_swallow_end_tag() {
    let settings = || HtmlSettings {
        remove_tags_without_content: true,
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings(), "<div><p>a</p><div></div>b</div>"),
        "<div><p>a</p>b</div>"
    );
    assert_eq!(
        minify(settings(), "<ul><li>a</li><li></li>b</ul>"),
        "<ul><li>a</li>b</ul>"
    );
    assert_eq!(
        minify(settings(), "<div><p>a</p><i></i></div>"),
        "<div><p>a</div>"
    );
}

#[test]
fn test_end_tag_retried_after_removed_element() {
    let settings = HtmlSettings {
        remove_tags_without_content: true,
        whitespace_minification_mode: WhitespaceMinificationMode::Safe,
        ..HtmlSettings::default()
    };
    let minifier = HtmlMinifier::new(settings);
    let once = minifier.minify("<p>p</p><i></i><!-- n --><p>q ").minified_content;
    assert_eq!(once, "<p>p<p>q");
    assert_eq!(minifier.minify(&once).minified_content, once);
}

#[test]
fn test_nested_empty_elements_removed() {
    let settings = || HtmlSettings {
        remove_tags_without_content: true,
        ..HtmlSettings::default()
    };
    assert_eq!(minify(settings(), "<div><span></span></div>x"), "x");
    // `<div>` closes the paragraph, so it has to stay.
    assert_eq!(minify(settings(), "<p>a<div></div>b"), "<p>a<div></div>b");
}

#[test]
fn test_optional_end_tags_elided_either_way() {
    let implied = minify_default("<ul><li>a<li>b</ul>");
    let explicit = minify_default("<ul><li>a</li><li>b</li></ul>");
    assert_eq!(implied, "<ul><li>a<li>b</ul>");
    assert_eq!(explicit, implied);
}

#[test]
fn test_preserved_optional_tags_keep_end_tags() {
    let settings = HtmlSettings {
        preservable_optional_tags: vec!["li".into()],
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings, "<ul><li>a</li><li>b</li></ul>"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn test_preserved_optional_tags_by_parent_and_at_end() {
    let settings = HtmlSettings {
        preservable_optional_tags: vec!["p".into()],
        ..HtmlSettings::default()
    };
    assert_eq!(minify(settings, "<div><p>x</p></div>"), "<div><p>x</p></div>");

    let settings = HtmlSettings {
        preservable_optional_tags: vec!["body".into()],
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings, "<html><body>x</body></html>"),
        "<html><body>x</body>"
    );
}

#[test]
fn test_column_group_kept_before_col() {
    let source = "<table><colgroup><col></colgroup><col></table>";
    assert_eq!(minify_default(source), source);
}

#[test]
fn test_paragraph_end_tag_elided_by_parent() {
    assert_eq!(
        minify_default("<div>\n  <p> Hello   world </p>\n</div>"),
        "<div><p>Hello world</div>"
    );
}

// ============================================================================
// Whitespace
// ============================================================================

#[test]
fn test_inline_whitespace_survives_medium() {
    assert_eq!(minify_default("<p>a <b>bold</b> c</p>"), "<p>a <b>bold</b> c</p>");
}

#[test]
fn test_aggressive_trims_around_inline_tags() {
    let settings = HtmlSettings {
        whitespace_minification_mode: WhitespaceMinificationMode::Aggressive,
        ..HtmlSettings::default()
    };
    assert_eq!(minify(settings, "<div> <b>x</b> </div>"), "<div><b>x</b></div>");
}

#[test]
fn test_pre_is_preserved() {
    assert_eq!(
        minify_default("<pre>  a\n   b  </pre>"),
        "<pre>  a\n   b  </pre>"
    );
}

#[test]
fn test_whitespace_none_keeps_source() {
    let settings = HtmlSettings {
        whitespace_minification_mode: WhitespaceMinificationMode::None,
        ..HtmlSettings::default()
    };
    assert_eq!(minify(settings, "  <p>a   b</p>  "), "  <p>a   b</p>  ");
}

#[test]
fn test_comments() {
    assert_eq!(minify_default("a <!-- note --> b"), "a b");

    let settings = HtmlSettings {
        preservable_html_comments: vec![r"^\s*keep".into()],
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings, "<!-- keep me --><!-- drop me -->x"),
        "<!-- keep me -->x"
    );
}

// ============================================================================
// Embedded code
// ============================================================================

#[test]
fn test_script_cdata_wrapper_kept() {
    let settings = HtmlSettings {
        remove_cdata_sections_from_scripts_and_styles: false,
        whitespace_minification_mode: WhitespaceMinificationMode::Medium,
        ..HtmlSettings::default()
    };
    let result = HtmlMinifier::new(settings)
        .minify("<script type=\"text/javascript\">//<![CDATA[\n  var a = 1;\r\n  var b = 2;\n//]]></script>");
    assert_eq!(
        result.minified_content,
        "<script>//<![CDATA[\nvar a = 1;\r\n  var b = 2;\n//]]></script>"
    );
}

#[test]
fn test_script_wrappers_round_trip() {
    let bodies = [
        "//<![CDATA[\nrun();\n//]]>",
        "<!--\nrun();\n//-->",
        "<!--//--><![CDATA[//><!--\nrun();\n//--><!]]>",
    ];
    for body in bodies {
        let source = format!("<script>{body}</script>");

        let keep = HtmlSettings {
            remove_cdata_sections_from_scripts_and_styles: false,
            remove_html_comments_from_scripts_and_styles: false,
            ..HtmlSettings::default()
        };
        let kept = HtmlMinifier::new(keep).minify(&source);
        assert_eq!(kept.minified_content, source);

        let stripped = HtmlMinifier::default().minify(&source);
        assert_eq!(stripped.minified_content, "<script>run();</script>");
    }
}

#[test]
fn test_style_wrappers_round_trip() {
    let keep = HtmlSettings {
        remove_cdata_sections_from_scripts_and_styles: false,
        remove_html_comments_from_scripts_and_styles: false,
        ..HtmlSettings::default()
    };
    let minifier = HtmlMinifier::new(keep);
    let stripped = HtmlMinifier::default();
    for source in [
        "<style>/*<![CDATA[*/p{color:red}/*]]>*/</style>",
        "<style><!--p{color:red}--></style>",
        "<style><!--/*--><![CDATA[/*><!--*/p{color:red}/*]]>*/--></style>",
    ] {
        assert_eq!(minifier.minify(source).minified_content, source);
        assert_eq!(stripped.minify(source).minified_content, "<style>p{color:red}</style>");
    }

    assert_eq!(
        stripped.minify("<style><!-- p{color:red} --></style>").minified_content,
        "<style>p{color:red}</style>"
    );
}

#[test]
fn test_script_error_is_a_warning() {
    let result = HtmlMinifier::default()
        .with_js_minifier(CrudeJsMinifier)
        .minify("<p>x</p>\n<script>var s = \"open;</script>");
    assert!(result.is_success());
    assert!(result.minified_content.contains("var s = \"open;"));
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.category == ErrorCategory::JsMinificationError && w.line_number == 2)
    );
}

#[test]
fn test_json_script() {
    assert_eq!(
        minify_default("<script type=\"application/ld+json\">{ \"a\" : 1 }</script>"),
        "<script type=application/ld+json>{\"a\":1}</script>"
    );
}

#[test]
fn test_template_script_is_reminified() {
    assert_eq!(
        minify_default("<script type=\"text/html\"><div>  <b>x</b> </div></script>"),
        "<script type=text/html><div><b>x</b></div></script>"
    );
}

#[test]
fn test_svg_island() {
    assert_eq!(
        minify_default("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1 1\">\n  <circle r=\"1\"/>\n</svg>"),
        "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>"
    );
}

#[test]
fn test_malformed_svg_island_kept() {
    let result = HtmlMinifier::default().minify("<svg><g></svg>");
    assert!(result.is_success());
    assert_eq!(result.minified_content, "<svg><g></svg>");
    assert_eq!(result.warnings[0].category, ErrorCategory::XmlMinificationError);
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_knockout_bindings() {
    let settings = HtmlSettings {
        minify_knockout_binding_expressions: true,
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(
            settings,
            r#"<!-- ko foreach: items --><li data-bind="text: name"></li><!-- /ko -->"#
        ),
        "<!--ko foreach:items--><li data-bind=text:name></li><!--/ko-->"
    );
}

#[test]
fn test_angular_bindings() {
    let settings = HtmlSettings {
        minify_angular_binding_expressions: true,
        process_template_tags: true,
        ..HtmlSettings::default()
    };
    assert_eq!(
        minify(settings, r#"<p data-ng-click="save( item )">{{ a + b }}</p>"#),
        "<p data-ng-click=save(item)>{{a+b}}</p>"
    );
}

// ============================================================================
// XHTML
// ============================================================================

#[test]
fn test_xhtml_output() {
    let result = HtmlMinifier::new_xhtml(HtmlSettings::xhtml()).minify("<p>a<br>b</p><input disabled>");
    assert_eq!(result.minified_content, r#"<p>a<br />b</p><input disabled="disabled" />"#);
}

// ============================================================================
// Result contract
// ============================================================================

#[test]
fn test_parse_error_voids_output() {
    let result = HtmlMinifier::default().minify("<div>\n  </span></div>");
    assert!(result.minified_content.is_empty());
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.category, ErrorCategory::HtmlParsingError);
    assert_eq!((error.line_number, error.column_number), (2, 3));
    assert!(error.source_fragment.contains("</span>"));
}

#[test]
fn test_empty_input() {
    let result = HtmlMinifier::default().minify("");
    assert!(result.is_success());
    assert!(result.minified_content.is_empty());
}

#[test]
fn test_statistics() {
    let result = HtmlMinifier::default().minify_with_statistics("<p>  a  </p>", true);
    let statistics = result.statistics.unwrap();
    assert_eq!(statistics.original_size, 12);
    assert_eq!(statistics.minified_size, "<p>a</p>".len());
}

const UNITS: &[&str] = &[
    "hello",
    " ",
    "\n  ",
    "<b>bold</b>",
    "<br>",
    "<p>para</p>",
    "<ul><li>a</li><li>b</li></ul>",
    "<!-- note -->",
    "<div> x </div>",
    "<span> y </span>",
    "<i></i>",
    "<div></div>",
    "<p>q",
];

fn idempotence_settings() -> Vec<HtmlSettings> {
    vec![
        HtmlSettings::default(),
        HtmlSettings {
            whitespace_minification_mode: WhitespaceMinificationMode::Safe,
            remove_tags_without_content: true,
            ..HtmlSettings::default()
        },
        HtmlSettings {
            whitespace_minification_mode: WhitespaceMinificationMode::Aggressive,
            ..HtmlSettings::default()
        },
        HtmlSettings {
            remove_tags_without_content: true,
            ..HtmlSettings::default()
        },
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_minification_is_idempotent(units in prop::collection::vec(0..UNITS.len(), 0..12)) {
        let source: String = units.iter().map(|&i| UNITS[i]).collect();
        for settings in idempotence_settings() {
            let minifier = HtmlMinifier::new(settings);
            let once = minifier.minify(&source);
            prop_assert!(once.is_success());
            let twice = minifier.minify(&once.minified_content);
            prop_assert_eq!(&twice.minified_content, &once.minified_content);
        }
    }

    #[test]
    fn test_errors_void_content(source in "[<>/a-z \"=!-]{0,24}") {
        let result = HtmlMinifier::default().minify(&source);
        prop_assert_eq!(result.is_success(), result.errors.is_empty());
        if !result.errors.is_empty() {
            prop_assert!(result.minified_content.is_empty());
            prop_assert_eq!(result.errors.len(), 1);
        }
    }
}
