// Example: a grid with a bounded view cache.
use virtual_scroll::{
    CacheLimit, ItemSize, ScrollPosition, ViewFactory, ViewportSize, VirtualScroll,
    VirtualScrollOptions,
};

/// Counts lifecycle calls instead of drawing anything.
#[derive(Debug, Default)]
struct Tiles {
    next_id: u64,
    attached: Vec<u64>,
    created: usize,
    destroyed: usize,
}

impl ViewFactory<u32> for Tiles {
    type Handle = u64;

    fn create(&mut self, _item: &u32, _index: usize, position: Option<usize>) -> u64 {
        self.next_id += 1;
        self.created += 1;
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, self.next_id);
        self.next_id
    }

    fn destroy(&mut self, handle: u64) {
        self.destroyed += 1;
        self.attached.retain(|&h| h != handle);
    }

    fn move_to(&mut self, handle: &u64, position: usize) {
        self.attached.retain(|h| h != handle);
        let at = position.min(self.attached.len());
        self.attached.insert(at, *handle);
    }

    fn detach(&mut self, handle: &u64) {
        self.attached.retain(|h| h != handle);
    }

    fn insert(&mut self, handle: &u64, position: Option<usize>) {
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, *handle);
    }

    fn index_of(&self, handle: &u64) -> Option<usize> {
        self.attached.iter().position(|h| h == handle)
    }

    fn len(&self) -> usize {
        self.attached.len()
    }

    fn refresh(&mut self, _handle: &u64, _item: &u32, _index: usize) {}
}

fn main() {
    let options: VirtualScrollOptions<u32> = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(64, 64))
        .with_grid_list(true)
        .with_buffer_length(1.0)
        .with_view_cache_limit(CacheLimit::Limited(24));
    let mut v = VirtualScroll::with_factory(options, Tiles::default());
    v.set_items((0..5_000).collect()).expect("no pass in flight");
    v.set_viewport(ViewportSize::new(320, 256));
    println!("items_per_row={}", v.items_per_row());

    // Down and back up again; the way back is mostly cache hits.
    let path: Vec<u64> = (0..20).chain((0..20).rev()).map(|step| step * 128).collect();
    for y in path {
        v.set_scroll_position(ScrollPosition::new(0, y));
        v.update().expect("factory attached");
        let s = v.last_stats();
        println!(
            "y={y:5} window={:?} moves={} hits={} misses={} cached={}",
            v.window(),
            s.moves,
            s.hits,
            s.misses,
            v.views().cached().len()
        );
    }

    let tiles = v.factory().expect("factory attached");
    println!("created={} destroyed={}", tiles.created, tiles.destroyed);
}
