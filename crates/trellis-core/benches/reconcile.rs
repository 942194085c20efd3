use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::dom::Dom;
use trellis_core::memory::MemoryDom;
use trellis_core::vdom::{element, text, Props, VNode};
use trellis_core::App;

const ROW_SAMPLES: &[usize] = &[16, 64, 256];

fn row(index: usize, label: &str) -> VNode {
    element(
        "li",
        Props::new().attr("data-row", index),
        text(format!("{label} {index}")),
    )
    .keyed(index)
}

fn list(rows: usize, label: &str, rotate: usize) -> VNode {
    let children: Vec<VNode> = (0..rows)
        .map(|index| row((index + rotate) % rows, label))
        .collect();
    element("ul", Props::new(), children)
}

struct Fixture {
    app: App<MemoryDom>,
    root: usize,
}

impl Fixture {
    fn new() -> Self {
        let mut dom = MemoryDom::new();
        let root = dom.create_element("root");
        Self {
            app: App::new(dom),
            root,
        }
    }

    fn render(&mut self, tree: VNode) {
        let root = self.root;
        self.app.render(move |_| root, tree);
        self.app.process().expect("update pass");
        self.app.flush_effects().expect("effect flush");
    }
}

fn bench_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");
    for &rows in ROW_SAMPLES {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut fixture = Fixture::new();
                fixture.render(list(rows, "item", 0));
                black_box(fixture.app.dom().mutation_count());
            });
        });
    }
    group.finish();
}

fn bench_update_in_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_in_place");
    for &rows in ROW_SAMPLES {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let mut fixture = Fixture::new();
            fixture.render(list(rows, "item", 0));
            let mut generation = 0usize;
            b.iter(|| {
                generation += 1;
                let label = if generation % 2 == 0 { "item" } else { "other" };
                fixture.render(list(rows, label, 0));
                black_box(fixture.app.dom().mutation_count());
            });
        });
    }
    group.finish();
}

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder");
    for &rows in ROW_SAMPLES {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let mut fixture = Fixture::new();
            fixture.render(list(rows, "item", 0));
            let mut rotate = 0usize;
            b.iter(|| {
                rotate = (rotate + 1) % rows;
                fixture.render(list(rows, "item", rotate));
                black_box(fixture.app.dom().mutation_count());
            });
        });
    }
    group.finish();
}

criterion_group!(reconcile, bench_mount, bench_update_in_place, bench_reorder);
criterion_main!(reconcile);
