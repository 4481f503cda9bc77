// Example: a text "container" driven by the engine through a scroll.
use virtual_scroll::{
    ItemSize, ScrollPosition, UpdateOutcome, ViewFactory, ViewportSize, VirtualScroll,
    VirtualScrollOptions,
};

/// Keeps rendered rows as strings, in container order.
#[derive(Default)]
struct Rows {
    next_id: usize,
    attached: Vec<(usize, String)>,
}

impl ViewFactory<String> for Rows {
    type Handle = usize;

    fn create(&mut self, item: &String, index: usize, position: Option<usize>) -> usize {
        self.next_id += 1;
        let row = (self.next_id, format!("#{index} {item}"));
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, row);
        self.next_id
    }

    fn destroy(&mut self, handle: usize) {
        self.attached.retain(|(id, _)| *id != handle);
    }

    fn move_to(&mut self, handle: &usize, position: usize) {
        if let Some(from) = self.index_of(handle) {
            let row = self.attached.remove(from);
            let at = position.min(self.attached.len());
            self.attached.insert(at, row);
        }
    }

    fn detach(&mut self, handle: &usize) {
        self.attached.retain(|(id, _)| id != handle);
    }

    fn insert(&mut self, handle: &usize, position: Option<usize>) {
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, (*handle, String::new()));
    }

    fn index_of(&self, handle: &usize) -> Option<usize> {
        self.attached.iter().position(|(id, _)| id == handle)
    }

    fn len(&self) -> usize {
        self.attached.len()
    }

    fn refresh(&mut self, handle: &usize, item: &String, index: usize) {
        if let Some(row) = self.attached.iter_mut().find(|(id, _)| id == handle) {
            row.1 = format!("#{index} {item}");
        }
    }
}

fn main() {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(200, 20))
        .with_buffer_length(0.5)
        .with_view_cache_limit(8usize);
    let mut v = VirtualScroll::with_factory(options, Rows::default());
    v.set_items((0..10_000).map(|i| format!("item {i}")).collect())
        .expect("no pass in flight");
    v.set_viewport(ViewportSize::new(200, 100));

    for y in [0u64, 40, 400, 40] {
        v.set_scroll_position(ScrollPosition::new(0, y));
        match v.update().expect("factory attached") {
            UpdateOutcome::Rendered(stats) => println!(
                "y={y} window={:?} space_before={} space_after={} {stats:?}",
                v.window(),
                v.space_before(),
                v.space_after()
            ),
            other => println!("y={y} {other:?}"),
        }
    }

    let rows = &v.factory().expect("factory attached").attached;
    println!("rendered rows: {:?}", rows.iter().map(|(_, r)| r).collect::<Vec<_>>());
    println!("cached views: {}", v.views().cached().len());
}
