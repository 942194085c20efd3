//! HTML element factories for Trellis.
//!
//! One constructor per supported tag, returning the declarative element
//! node the reconciler consumes. The static attribute schema in [`schema`]
//! backs a debug-build authoring check; release builds pay nothing for it.

pub mod schema;

use trellis_core::vdom::{element, Props, VChildren, VNode};

fn make(tag: &'static str, props: Props, children: VChildren) -> VNode {
    #[cfg(debug_assertions)]
    for (name, _) in props.iter() {
        if !schema::is_recognized(tag, name) {
            log::warn!("unknown attribute `{name}` on <{tag}>");
        }
    }
    element(tag, props, children)
}

macro_rules! element_factories {
    ($($tag:ident)*) => {
        $(
            pub fn $tag(props: Props, children: impl Into<VChildren>) -> VNode {
                make(stringify!($tag), props, children.into())
            }
        )*
    };
}

element_factories! {
    html base head link meta style title
    body address article aside footer header
    h1 h2 h3 h4 h5 h6 hgroup main nav section
    blockquote dd div dl dt figcaption figure hr li ol p pre ul
    a abbr b bdi bdo br cite code data dfn em i kbd mark q
    rb rp rt rtc ruby s samp small span strong sub sup time u var wbr
    area audio img map track video
    embed iframe object param picture source canvas noscript script
    del ins
    caption col colgroup table tbody td tfoot th thead tr
    button datalist fieldset form input label legend meter
    optgroup option output progress select textarea
    details dialog menu summary
}

pub mod prelude {
    pub use crate::{
        a, button, div, form, h1, h2, h3, img, input, label, li, ol, p, section, span, table,
        td, textarea, th, tr, ul,
    };
    pub use trellis_core::vdom::{fragment, text, Props, Style};
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::vdom::{text, VNode};

    #[test]
    fn factories_build_elements_with_their_tag() {
        let node = div(Props::new().attr("class", "wrap"), text("hi"));
        match node {
            VNode::Element(el) => {
                assert_eq!(el.tag, "div");
                assert!(el.props.contains("class"));
            }
            _ => panic!("expected an element"),
        }
    }

    #[test]
    fn factories_accept_nested_children() {
        let node = ul(
            Props::new(),
            vec![
                li(Props::new(), text("one")),
                li(Props::new(), text("two")),
            ],
        );
        match node {
            VNode::Element(el) => assert_eq!(el.tag, "ul"),
            _ => panic!("expected an element"),
        }
    }
}
