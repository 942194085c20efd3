use std::cell::Cell;

use trellis_core::deps;
use trellis_core::hooks::{use_effect, use_state};
use trellis_core::vdom::{component, element, text, Props, VChildren};
use trellis_testing::TestHost;

thread_local! {
    static EFFECT_RUNS: Cell<usize> = Cell::new(0);
}

fn ticker(_: &Props) -> VChildren {
    let (count, set_count) = use_state(|| 0i64);
    use_effect(
        || EFFECT_RUNS.with(|runs| runs.set(runs.get() + 1)),
        deps![],
    );
    element(
        "button",
        Props::new().on("click", move |_| set_count.update(|count| count + 1)),
        text(count),
    )
    .into()
}

#[test]
fn host_pumps_update_commit_and_effect_phases() {
    let mut host = TestHost::new();
    host.render(component(ticker, Props::new()));
    assert_eq!(host.text(), "0");
    assert_eq!(EFFECT_RUNS.with(|runs| runs.get()), 1);

    let button = host.root_children()[0];
    host.fire(button, "click");
    assert_eq!(host.text(), "1");
    // mount-only effect does not re-run
    assert_eq!(EFFECT_RUNS.with(|runs| runs.get()), 1);
}

#[test]
fn effects_wait_for_the_flush_turn() {
    let mut host = TestHost::new();
    let root = host.root();
    host.app_mut()
        .render(move |_| root, component(ticker, Props::new()));

    host.process_only();
    assert_eq!(EFFECT_RUNS.with(|runs| runs.get()), 0);
    assert!(host.flush_requested());

    host.settle();
    assert_eq!(EFFECT_RUNS.with(|runs| runs.get()), 1);
}
