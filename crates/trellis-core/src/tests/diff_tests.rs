use std::cell::{Cell, RefCell};

use super::support::Host;
use crate::deps;
use crate::hooks::{use_effect, use_state};
use crate::vdom::{component, element, fragment, text, PropValue, Props, VChildren, VNode};

thread_local! {
    static NEXT_BADGE: Cell<i64> = Cell::new(0);
    static REMOVAL_LOG: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

fn li(key: &str, label: &str) -> VNode {
    element("li", Props::new().attr("data-label", label), text(label)).keyed(key)
}

#[test]
fn keyed_reorder_moves_dom_nodes_without_remounting() {
    let mut host = Host::new();
    host.render(element(
        "ul",
        Props::new(),
        vec![li("1", "A"), li("2", "B"), li("3", "C")],
    ));
    let list = host.root_children()[0];
    let before = host.dom().children(list).unwrap().to_vec();
    assert_eq!(host.text(), "ABC");

    host.render(element(
        "ul",
        Props::new(),
        vec![li("3", "C"), li("1", "A"), li("2", "B")],
    ));
    let after = host.dom().children(list).unwrap().to_vec();
    assert_eq!(host.text(), "CAB");

    // same three DOM nodes, permuted: no teardown, no creation
    assert_eq!(after[0], before[2]);
    assert_eq!(after[1], before[0]);
    assert_eq!(after[2], before[1]);
}

/// Each badge instance captures a creation-ordered number in state on its
/// first render; surviving a reorder means keeping that number.
fn badge(props: &Props) -> VChildren {
    let label = match props.get("label") {
        Some(PropValue::Str(label)) => label.to_string(),
        _ => String::new(),
    };
    let (badge, _) = use_state(|| {
        NEXT_BADGE.with(|next| {
            let value = next.get();
            next.set(value + 1);
            value
        })
    });
    element(
        "span",
        Props::new().attr("data-badge", badge),
        text(format!("{label}{badge}")),
    )
    .into()
}

fn badge_node(key: &str, label: &str) -> VNode {
    component(badge, Props::new().attr("label", label)).keyed(key)
}

#[test]
fn keyed_reorder_preserves_component_hook_state() {
    let mut host = Host::new();
    host.render(vec![
        badge_node("a", "A"),
        badge_node("b", "B"),
        badge_node("c", "C"),
    ]);
    assert_eq!(host.text(), "A0B1C2");

    host.render(vec![
        badge_node("c", "C"),
        badge_node("a", "A"),
        badge_node("b", "B"),
    ]);
    assert_eq!(host.text(), "C2A0B1");
    // no instance was recreated, so no new badge number was taken
    assert_eq!(NEXT_BADGE.with(|next| next.get()), 3);
}

#[test]
fn removal_drops_dom_and_instances() {
    let mut host = Host::new();
    host.render(vec![li("1", "A"), li("2", "B"), li("3", "C")]);
    assert_eq!(host.text(), "ABC");
    assert_eq!(host.root_children().len(), 3);

    host.render(vec![li("1", "A"), li("3", "C")]);
    assert_eq!(host.text(), "AC");
    assert_eq!(host.root_children().len(), 2);
}

#[test]
fn empty_next_list_unmounts_everything() {
    let mut host = Host::new();
    host.render(vec![li("1", "A"), li("2", "B")]);
    assert_eq!(host.root_children().len(), 2);

    host.render(Vec::<VNode>::new());
    assert_eq!(host.root_children().len(), 0);
    assert_eq!(host.text(), "");
}

#[test]
#[should_panic(expected = "keys must be unique")]
fn duplicate_sibling_keys_panic() {
    let mut host = Host::new();
    host.render(vec![li("dup", "A"), li("dup", "B")]);
}

#[test]
fn key_match_with_incompatible_kind_rebuilds() {
    let mut host = Host::new();
    host.render(vec![element("div", Props::new(), text("A")).keyed("x")]);
    let before = host.root_children()[0];
    assert_eq!(host.dom().tag(before).unwrap(), "div");

    host.render(vec![element("span", Props::new(), text("A")).keyed("x")]);
    let after = host.root_children()[0];
    assert_eq!(host.dom().tag(after).unwrap(), "span");
    assert_ne!(before, after);
}

fn logged(props: &Props) -> VChildren {
    let name = match props.get("name") {
        Some(PropValue::Str(name)) => name.to_string(),
        _ => String::new(),
    };
    let cleanup_name = name.clone();
    use_effect(
        move || move || REMOVAL_LOG.with(|log| log.borrow_mut().push(cleanup_name.clone())),
        deps![],
    );
    element("i", Props::new(), text(name)).into()
}

#[test]
fn component_to_element_swap_under_one_key_resets_state() {
    let mut host = Host::new();
    host.render(vec![
        component(logged, Props::new().attr("name", "inner")).keyed("k")
    ]);
    assert_eq!(host.text(), "inner");

    host.render(vec![element("b", Props::new(), text("flat")).keyed("k")]);
    assert_eq!(host.text(), "flat");
    REMOVAL_LOG.with(|log| assert_eq!(*log.borrow(), vec!["inner"]));
}

#[test]
fn fragments_keep_document_order_around_siblings() {
    let mut host = Host::new();
    host.render(vec![
        fragment(VChildren::Many(vec![
            element("span", Props::new(), text("a")).into(),
            element("span", Props::new(), text("b")).into(),
        ]))
        .keyed("frag"),
        element("div", Props::new(), text("c")).keyed("tail"),
    ]);
    assert_eq!(host.text(), "abc");

    host.render(vec![
        element("div", Props::new(), text("c")).keyed("tail"),
        fragment(VChildren::Many(vec![
            element("span", Props::new(), text("a")).into(),
            element("span", Props::new(), text("b")).into(),
        ]))
        .keyed("frag"),
    ]);
    assert_eq!(host.text(), "cab");
}

#[test]
fn growing_a_list_inserts_at_the_right_anchor() {
    let mut host = Host::new();
    host.render(vec![li("1", "A"), li("3", "C")]);
    assert_eq!(host.text(), "AC");

    host.render(vec![li("1", "A"), li("2", "B"), li("3", "C")]);
    assert_eq!(host.text(), "ABC");

    host.render(vec![
        li("0", "Z"),
        li("1", "A"),
        li("2", "B"),
        li("3", "C"),
        li("4", "D"),
    ]);
    assert_eq!(host.text(), "ZABCD");
}

#[test]
fn unkeyed_children_reconcile_by_position() {
    let mut host = Host::new();
    host.render(vec![
        element("p", Props::new(), text("one")),
        element("p", Props::new(), text("two")),
    ]);
    let before = host.root_children();
    assert_eq!(host.text(), "onetwo");

    host.render(vec![
        element("p", Props::new(), text("uno")),
        element("p", Props::new(), text("dos")),
    ]);
    let after = host.root_children();
    assert_eq!(host.text(), "unodos");
    assert_eq!(before, after);
}

#[test]
fn nested_components_expand_depth_first() {
    fn leaf(_: &Props) -> VChildren {
        text("leaf").into()
    }
    fn middle(_: &Props) -> VChildren {
        element("div", Props::new(), vec![component(leaf, Props::new())]).into()
    }

    let mut host = Host::new();
    host.render(component(middle, Props::new()));
    assert_eq!(host.text(), "leaf");
    let div = host.root_children()[0];
    assert_eq!(host.dom().tag(div).unwrap(), "div");
}
