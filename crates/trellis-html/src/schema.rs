//! Static attribute schema: pure data consumed as a typing aid during
//! element creation. The runtime attribute-application logic is generic
//! and does not depend on this table for correctness.

/// Attributes every HTML element accepts.
pub const GLOBAL_ATTRIBUTES: &[&str] = &[
    "autocapitalize",
    "class",
    "contenteditable",
    "contextmenu",
    "dir",
    "draggable",
    "dropzone",
    "enterkeyhint",
    "hidden",
    "id",
    "inputmode",
    "itemprop",
    "lang",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
];

const LINK_LIKE: &[&str] = &[
    "download",
    "href",
    "hreflang",
    "media",
    "ping",
    "referrerpolicy",
    "rel",
    "shape",
    "target",
];

const AREA: &[&str] = &[
    "alt",
    "coords",
    "download",
    "href",
    "hreflang",
    "media",
    "ping",
    "referrerpolicy",
    "rel",
    "shape",
    "target",
];

const MEDIA: &[&str] = &[
    "autoplay",
    "controls",
    "crossorigin",
    "loop",
    "muted",
    "preload",
    "src",
];

const VIDEO: &[&str] = &[
    "autoplay",
    "controls",
    "crossorigin",
    "height",
    "loop",
    "muted",
    "poster",
    "preload",
    "src",
    "width",
];

const BUTTON: &[&str] = &[
    "autofocus",
    "disabled",
    "form",
    "formaction",
    "formenctype",
    "formmethod",
    "formnovalidate",
    "formtarget",
    "name",
    "type",
    "value",
];

const FORM: &[&str] = &[
    "accept-charset",
    "action",
    "autocomplete",
    "enctype",
    "method",
    "name",
    "novalidate",
    "target",
];

const INPUT: &[&str] = &[
    "accept",
    "alt",
    "autocomplete",
    "autofocus",
    "capture",
    "checked",
    "dirname",
    "disabled",
    "form",
    "formaction",
    "formenctype",
    "formmethod",
    "formnovalidate",
    "formtarget",
    "height",
    "list",
    "max",
    "maxlength",
    "min",
    "minlength",
    "name",
    "pattern",
    "placeholder",
    "readonly",
    "required",
    "size",
    "src",
    "step",
    "type",
    "usemap",
    "value",
    "width",
];

const TEXTAREA: &[&str] = &[
    "autocomplete",
    "autofocus",
    "cols",
    "dirname",
    "disabled",
    "form",
    "maxlength",
    "minlength",
    "name",
    "placeholder",
    "readonly",
    "required",
    "rows",
    "wrap",
];

const SELECT: &[&str] = &[
    "autocomplete",
    "autofocus",
    "disabled",
    "form",
    "multiple",
    "name",
    "required",
    "size",
];

const IMG: &[&str] = &[
    "align",
    "alt",
    "crossorigin",
    "decoding",
    "height",
    "importance",
    "ismap",
    "loading",
    "referrerpolicy",
    "sizes",
    "src",
    "srcset",
    "usemap",
    "width",
];

const IFRAME: &[&str] = &[
    "align",
    "allow",
    "csp",
    "height",
    "importance",
    "loading",
    "name",
    "referrerpolicy",
    "sandbox",
    "src",
    "srcdoc",
    "width",
];

const TABLE_SECTION: &[&str] = &["align"];

const TABLE_CELL: &[&str] = &["align", "colspan", "headers", "rowspan"];

const SCRIPT: &[&str] = &[
    "async",
    "charset",
    "crossorigin",
    "defer",
    "importance",
    "integrity",
    "language",
    "referrerpolicy",
    "src",
    "type",
];

const LINK_ELEMENT: &[&str] = &[
    "crossorigin",
    "href",
    "hreflang",
    "importance",
    "integrity",
    "media",
    "referrerpolicy",
    "rel",
    "sizes",
];

const METER: &[&str] = &["form", "high", "low", "max", "min", "optimum", "value"];

const SIZED: &[&str] = &["height", "width"];

const CITED: &[&str] = &["cite"];

const DATED: &[&str] = &["cite", "datetime"];

const TRACK: &[&str] = &["default", "kind", "label", "src", "srclang"];

const SOURCE: &[&str] = &["media", "sizes", "src", "srcset", "type"];

const OBJECT: &[&str] = &[
    "data",
    "form",
    "height",
    "name",
    "type",
    "typemustmatch",
    "usemap",
    "width",
];

const OPTION: &[&str] = &["disabled", "label", "selected", "value"];

const EMBED: &[&str] = &["height", "src", "type", "width"];

const COL: &[&str] = &["align", "span"];

/// Tag-specific attributes beyond [`GLOBAL_ATTRIBUTES`], or `None` for tags
/// outside the catalog.
pub fn attributes_for(tag: &str) -> Option<&'static [&'static str]> {
    let extras: &'static [&'static str] = match tag {
        "a" => LINK_LIKE,
        "area" => AREA,
        "audio" => MEDIA,
        "base" => &["href", "target"],
        "blockquote" | "q" => CITED,
        "button" => BUTTON,
        "canvas" => SIZED,
        "caption" | "hr" | "table" | "tbody" | "tfoot" | "thead" | "tr" => TABLE_SECTION,
        "col" | "colgroup" => COL,
        "data" | "param" | "output" => &["name", "value", "for", "form"],
        "del" | "ins" => DATED,
        "details" => &["open"],
        "embed" => EMBED,
        "fieldset" => &["disabled", "form", "name"],
        "form" => FORM,
        "html" => &["manifest"],
        "iframe" => IFRAME,
        "img" => IMG,
        "input" => INPUT,
        "label" => &["for", "form"],
        "li" => &["value"],
        "link" => LINK_ELEMENT,
        "map" => &["name"],
        "menu" => &["type"],
        "meta" => &["charset", "content", "http-equiv", "name"],
        "meter" => METER,
        "object" => OBJECT,
        "ol" => &["reversed", "start"],
        "optgroup" => &["disabled", "label"],
        "option" => OPTION,
        "progress" => &["form", "max", "value"],
        "script" => SCRIPT,
        "select" => SELECT,
        "source" => SOURCE,
        "style" => &["media", "scoped", "type"],
        "td" | "th" => TABLE_CELL,
        "textarea" => TEXTAREA,
        "time" => &["datetime"],
        "track" => TRACK,
        "video" => VIDEO,
        "head" | "title" | "body" | "address" | "article" | "aside" | "footer" | "header"
        | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "hgroup" | "main" | "nav" | "section"
        | "dd" | "div" | "dl" | "dt" | "figcaption" | "figure" | "p" | "pre" | "ul" | "abbr"
        | "b" | "bdi" | "bdo" | "br" | "cite" | "code" | "dfn" | "em" | "i" | "kbd" | "mark"
        | "rb" | "rp" | "rt" | "rtc" | "ruby" | "s" | "samp" | "small" | "span" | "strong"
        | "sub" | "sup" | "u" | "var" | "wbr" | "picture" | "noscript" | "datalist"
        | "legend" | "dialog" | "summary" => &[],
        _ => return None,
    };
    Some(extras)
}

/// Whether the schema recognizes `name` on `tag`. Event handlers, data and
/// aria attributes, and the reconciler's synthetic keys always pass.
pub fn is_recognized(tag: &str, name: &str) -> bool {
    if name == "key" || name == "ref" || name == "children" || name == "value" {
        return true;
    }
    if name.starts_with("on") || name.starts_with("data-") || name.starts_with("aria-") {
        return true;
    }
    if GLOBAL_ATTRIBUTES.contains(&name) {
        return true;
    }
    match attributes_for(tag) {
        Some(extras) => extras.contains(&name),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_apply_to_every_tag() {
        assert!(is_recognized("div", "class"));
        assert!(is_recognized("video", "tabindex"));
    }

    #[test]
    fn tag_specific_attributes_do_not_leak() {
        assert!(is_recognized("input", "checked"));
        assert!(!is_recognized("div", "checked"));
    }

    #[test]
    fn synthetic_and_event_keys_always_pass() {
        assert!(is_recognized("div", "onclick"));
        assert!(is_recognized("div", "data-anything"));
        assert!(is_recognized("div", "ref"));
    }

    #[test]
    fn unknown_tags_have_no_schema() {
        assert_eq!(attributes_for("marquee"), None);
    }
}
