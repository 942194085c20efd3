//! CSS-in-Rust engine for Trellis.
//!
//! Compiles nested style literals into flat stylesheet text through a
//! visitor pipeline, names each compiled rule by a content hash, and keeps
//! the rules in a reference-counted registry. The reconciler consumes the
//! produced class names as ordinary attribute values; nothing here touches
//! the instance tree.

pub mod ast;
pub mod hash;
pub mod literal;
pub mod sheet;
pub mod stringify;
pub mod visit;
pub mod visitors;

pub use ast::{Ast, AstId, AstKind, ROOT};
pub use literal::{Entry, StyleLiteral, Value};
pub use sheet::Stylesheet;
pub use visit::{visit, Visitor};

use std::cell::RefCell;

use trellis_core::vdom::{Props, PropValue, VChildren, VNode};

pub struct CssOptions {
    /// Prefix for generated class names and the hash scope.
    pub prefix: String,
    /// Transform stages run after `parse`; `None` means the default
    /// pipeline.
    pub transformers: Option<Vec<Visitor>>,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            prefix: "css".to_string(),
            transformers: None,
        }
    }
}

/// Default stages after `parse`: property dashing, default units, at-rule
/// rewrapping, selector combination, then flattening.
pub fn default_pipeline() -> Vec<Visitor> {
    vec![
        visitors::dashify,
        visitors::units,
        visitors::split,
        visitors::selectors,
        visitors::hoist,
    ]
}

pub struct Css {
    options: CssOptions,
    sheet: RefCell<Stylesheet>,
}

impl Default for Css {
    fn default() -> Self {
        Self::new(CssOptions::default())
    }
}

impl Css {
    pub fn new(options: CssOptions) -> Self {
        Self {
            options,
            sheet: RefCell::new(Stylesheet::new()),
        }
    }

    fn process(&self, input: StyleLiteral) -> String {
        let mut pipeline: Vec<Visitor> = vec![visitors::parse];
        match &self.options.transformers {
            Some(custom) => pipeline.extend(custom.iter().copied()),
            None => pipeline.extend(default_pipeline()),
        }
        let mut tree = Ast::with_root(input);
        visit(&mut tree, ROOT, &pipeline);
        stringify::stringify(&tree, ROOT)
    }

    /// Compiles the literal, registers the resulting rule and returns its
    /// content-hashed class name. Calling it again with an equivalent
    /// literal reuses the registered rule.
    pub fn class_name(&self, literal: &StyleLiteral) -> String {
        let keyed = StyleLiteral::new().block(self.options.prefix.clone(), literal.clone());
        let hashed = hash::hash(&self.process(keyed));
        let class = format!("{}-{hashed}", self.options.prefix);

        let rule = if self.sheet.borrow().has(&class) {
            None
        } else {
            let selector = format!(".{class}");
            Some(self.process(StyleLiteral::new().block(selector, literal.clone())))
        };
        log::trace!("css rule {class}");
        self.sheet.borrow_mut().enter(&class, rule);
        class
    }

    /// Releases one use of a class previously returned by
    /// [`Css::class_name`].
    pub fn release(&self, class: &str) {
        self.sheet.borrow_mut().exit(class);
    }

    /// Registers top-level rules (the literal's entries are whole blocks:
    /// selectors or at-rules).
    pub fn global(&self, rules: StyleLiteral) {
        let css = self.process(rules);
        let key = format!("{}global{}", self.options.prefix, hash::hash(&css));
        if self.sheet.borrow().has(&key) {
            self.sheet.borrow_mut().enter(&key, None);
        } else {
            self.sheet.borrow_mut().enter(&key, Some(css));
        }
    }

    /// Wraps an element factory so every node it produces carries the
    /// compiled class, prepended to any authored `class` value.
    pub fn styled<F>(&self, factory: F, literal: &StyleLiteral) -> impl Fn(Props, VChildren) -> VNode
    where
        F: Fn(Props, VChildren) -> VNode,
    {
        let class = self.class_name(literal);
        move |props, children| {
            let mut node = factory(props, children);
            if let VNode::Element(el) = &mut node {
                let merged = match el.props.get("class") {
                    Some(PropValue::Str(existing)) => format!("{class} {existing}"),
                    _ => class.clone(),
                };
                el.props.insert("class", merged);
            }
            node
        }
    }

    /// Text of every registered rule, for the host to install as a style
    /// element.
    pub fn stylesheet(&self) -> String {
        self.sheet.borrow().render()
    }

    pub fn sweep(&self) {
        self.sheet.borrow_mut().sweep();
    }
}

pub mod prelude {
    pub use crate::literal::{StyleLiteral, Value};
    pub use crate::style;
    pub use crate::{Css, CssOptions};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(literal: StyleLiteral) -> (String, String) {
        let css = Css::default();
        let class = css.class_name(&literal);
        let sheet = css.stylesheet();
        (class, sheet)
    }

    #[test]
    fn flat_declarations_compile_to_one_rule() {
        let (class, sheet) = compile(style! {
            "color": "red",
            "fontWeight": "bold",
        });
        assert!(class.starts_with("css-"));
        assert_eq!(
            sheet,
            format!(".{class}{{\ncolor:red;\nfont-weight:bold;\n}}\n")
        );
    }

    #[test]
    fn numeric_lengths_get_default_units() {
        let (class, sheet) = compile(style! {
            "fontSize": 14,
            "lineHeight": 2,
            "margin": 0,
        });
        assert!(sheet.contains("font-size:14px;"));
        // line-height has no default unit
        assert!(sheet.contains("line-height:2;"));
        assert!(sheet.contains("margin:0px;"));
        assert!(sheet.starts_with(&format!(".{class}{{")));
    }

    #[test]
    fn nested_selectors_combine_and_hoist() {
        let (class, sheet) = compile(style! {
            "color": "red",
            "&:hover": { "color": "blue" },
            ".child": { "color": "green" },
        });
        assert!(sheet.contains(&format!(".{class}{{\ncolor:red;\n}}\n")));
        assert!(sheet.contains(&format!(".{class}:hover{{\ncolor:blue;\n}}\n")));
        assert!(sheet.contains(&format!(".{class} .child{{\ncolor:green;\n}}\n")));
    }

    #[test]
    fn at_rules_rewrap_their_declarations() {
        let (class, sheet) = compile(style! {
            "color": "red",
            "@media (max-width: 600px)": { "color": "green" },
        });
        assert!(sheet.contains("@media (max-width: 600px){\n"));
        assert!(sheet.contains(&format!(".{class}{{\ncolor:green;\n}}\n")));
    }

    #[test]
    fn equivalent_literals_share_one_rule() {
        let css = Css::default();
        let first = css.class_name(&style! { "color": "red" });
        let second = css.class_name(&style! { "color": "red" });
        assert_eq!(first, second);
        assert_eq!(css.stylesheet().matches("color:red;").count(), 1);
    }

    #[test]
    fn released_rules_survive_until_swept() {
        let css = Css::default();
        let class = css.class_name(&style! { "color": "red" });
        css.release(&class);
        assert!(css.stylesheet().contains("color:red;"));
        css.sweep();
        assert!(!css.stylesheet().contains("color:red;"));
    }

    #[test]
    fn global_rules_keep_their_own_selectors() {
        let css = Css::default();
        css.global(style! {
            "body": { "margin": 0 },
            "a": { "textDecoration": "none" },
        });
        let sheet = css.stylesheet();
        assert!(sheet.contains("body{\nmargin:0px;\n}\n"));
        assert!(sheet.contains("a{\ntext-decoration:none;\n}\n"));
    }

    #[test]
    fn styled_factories_prepend_the_generated_class() {
        use trellis_core::vdom::{element, text, Props, VChildren, VNode};

        let css = Css::default();
        let plain = |props: Props, children: VChildren| element("button", props, children);
        let fancy = css.styled(plain, &style! { "color": "red" });

        let node = fancy(Props::new().attr("class", "authored"), text("go").into());
        let VNode::Element(el) = node else {
            panic!("expected element");
        };
        let Some(PropValue::Str(class)) = el.props.get("class") else {
            panic!("expected class");
        };
        assert!(class.starts_with("css-"));
        assert!(class.ends_with(" authored"));
    }
}
