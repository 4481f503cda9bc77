use crate::*;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Op<T> {
    Create(u32, T, usize),
    Destroy(u32),
    Move(u32, usize),
    Detach(u32),
    Insert(u32),
    Refresh(u32, T, usize),
}

/// A container that records every call and keeps views in render order.
#[derive(Debug)]
struct MockContainer<T> {
    next_id: u32,
    attached: Vec<u32>,
    alive: HashSet<u32>,
    bound: HashMap<u32, T>,
    item_size: Option<ItemSize>,
    log: Rc<RefCell<Vec<Op<T>>>>,
}

impl<T: Clone> MockContainer<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            attached: Vec::new(),
            alive: HashSet::new(),
            bound: HashMap::new(),
            item_size: None,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn with_item_size(mut self, size: ItemSize) -> Self {
        self.item_size = Some(size);
        self
    }

    fn attached_items(&self) -> Vec<T> {
        self.attached
            .iter()
            .filter_map(|id| self.bound.get(id).cloned())
            .collect()
    }

    fn log(&self) -> Rc<RefCell<Vec<Op<T>>>> {
        Rc::clone(&self.log)
    }

    fn remove_attached(&mut self, id: u32) {
        self.attached.retain(|&h| h != id);
    }
}

impl<T: Clone> ViewFactory<T> for MockContainer<T> {
    type Handle = u32;

    fn create(&mut self, item: &T, index: usize, position: Option<usize>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, id);
        self.alive.insert(id);
        self.bound.insert(id, item.clone());
        self.log.borrow_mut().push(Op::Create(id, item.clone(), index));
        id
    }

    fn destroy(&mut self, handle: u32) {
        assert!(self.alive.remove(&handle), "view {handle} destroyed twice");
        self.remove_attached(handle);
        self.bound.remove(&handle);
        self.log.borrow_mut().push(Op::Destroy(handle));
    }

    fn move_to(&mut self, handle: &u32, position: usize) {
        self.remove_attached(*handle);
        let at = position.min(self.attached.len());
        self.attached.insert(at, *handle);
        self.log.borrow_mut().push(Op::Move(*handle, position));
    }

    fn detach(&mut self, handle: &u32) {
        self.remove_attached(*handle);
        self.log.borrow_mut().push(Op::Detach(*handle));
    }

    fn insert(&mut self, handle: &u32, position: Option<usize>) {
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, *handle);
        self.alive.insert(*handle);
        self.log.borrow_mut().push(Op::Insert(*handle));
    }

    fn index_of(&self, handle: &u32) -> Option<usize> {
        self.attached.iter().position(|h| h == handle)
    }

    fn len(&self) -> usize {
        self.attached.len()
    }

    fn refresh(&mut self, handle: &u32, item: &T, index: usize) {
        self.bound.insert(*handle, item.clone());
        self.log
            .borrow_mut()
            .push(Op::Refresh(*handle, item.clone(), index));
    }

    fn measure(&self, handle: &u32) -> Option<ItemSize> {
        self.attached.contains(handle).then_some(self.item_size?)
    }
}

const LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

fn letters_engine(
    cache: impl Into<CacheLimit>,
    viewport_height: u32,
) -> VirtualScroll<char, MockContainer<char>> {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(0.0)
        .with_view_cache_limit(cache);
    let mut v = VirtualScroll::with_factory(options, MockContainer::new());
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, viewport_height));
    v
}

fn scroll_to(v: &mut VirtualScroll<char, MockContainer<char>>, y: u64) -> RenderStats {
    v.set_scroll_position(ScrollPosition::new(0, y));
    match v.update().unwrap() {
        UpdateOutcome::Rendered(stats) => stats,
        other => panic!("expected a render pass, got {other:?}"),
    }
}

fn attached(v: &VirtualScroll<char, MockContainer<char>>) -> Vec<char> {
    v.factory().unwrap().attached_items()
}

#[test]
fn exact_fit_window_at_top() {
    let g = compute_window(
        5,
        ScrollPosition::new(0, 0),
        ViewportSize::new(100, 20),
        ItemSize::new(100, 10),
        0.0,
        1,
    )
    .unwrap();
    assert_eq!(g.window, Window::new(0, 2));
    assert_eq!(g.space_before, 0);
    assert_eq!(g.space_after, 30);
}

#[test]
fn buffer_expands_and_clamps() {
    let size = ItemSize::new(100, 10);
    let viewport = ViewportSize::new(100, 20);

    // 1 viewport of buffer on each side: [50 - 20, 50 + 20 + 20] = [30, 90]
    let g = compute_window(100, ScrollPosition::new(0, 50), viewport, size, 1.0, 1).unwrap();
    assert_eq!(g.window, Window::new(3, 9));
    assert_eq!(g.bounds.top, 30);
    assert_eq!(g.bounds.bottom, 90);
    assert_eq!(g.space_before, 30);
    assert_eq!(g.space_after, 910);

    // Top clamps at zero, bottom at the content height.
    let g = compute_window(5, ScrollPosition::new(0, 10), viewport, size, 2.0, 1).unwrap();
    assert_eq!(g.bounds.top, 0);
    assert_eq!(g.bounds.bottom, 50);
    assert_eq!(g.window, Window::new(0, 5));
    assert_eq!(g.space_after, 0);
}

#[test]
fn unknown_item_height_yields_no_window() {
    let g = compute_window(
        10,
        ScrollPosition::default(),
        ViewportSize::new(100, 100),
        ItemSize::new(100, 0),
        1.0,
        1,
    );
    assert!(g.is_none());
}

#[test]
fn empty_list_has_empty_window() {
    let g = compute_window(
        0,
        ScrollPosition::new(0, 500),
        ViewportSize::new(100, 100),
        ItemSize::new(100, 10),
        1.0,
        1,
    )
    .unwrap();
    assert_eq!(g.window, Window::new(0, 0));
    assert!(g.window.is_empty());
}

#[test]
fn grid_rows_align_window_to_row_starts() {
    assert_eq!(items_per_row(true, 300, 100), 3);
    assert_eq!(items_per_row(true, 250, 100), 2);
    assert_eq!(items_per_row(true, 50, 100), 1);
    assert_eq!(items_per_row(false, 300, 100), 1);

    let g = compute_window(
        10,
        ScrollPosition::new(0, 10),
        ViewportSize::new(300, 20),
        ItemSize::new(100, 10),
        0.0,
        3,
    )
    .unwrap();
    // Rows 1 and 2 are visible: items 3..9.
    assert_eq!(g.window, Window::new(3, 9));
    assert_eq!(g.space_before, 10);
    // One partial row (item 9) remains below.
    assert_eq!(g.space_after, 10);
}

#[test]
fn scrolled_past_the_end_stays_in_bounds() {
    let g = compute_window(
        5,
        ScrollPosition::new(0, 10_000),
        ViewportSize::new(100, 20),
        ItemSize::new(100, 10),
        0.0,
        1,
    )
    .unwrap();
    assert_eq!(g.window, Window::new(4, 5));
}

#[test]
fn window_bounds_hold_for_random_inputs() {
    let mut rng = Lcg::new(7);
    for _ in 0..2_000 {
        let count = rng.gen_range_u64(0, 500) as usize;
        let per_row = rng.gen_range_u64(1, 5) as usize;
        let scroll = rng.gen_range_u64(0, 20_000);
        let viewport = ViewportSize::new(400, rng.gen_range_u64(0, 800) as u32);
        let size = ItemSize::new(100, rng.gen_range_u64(1, 60) as u32);
        let buffer = rng.gen_range_u64(0, 4) as f32 * 0.5;

        let g = compute_window(
            count,
            ScrollPosition::new(0, scroll),
            viewport,
            size,
            buffer,
            per_row,
        )
        .unwrap();
        let w = g.window;
        assert!(w.min_index <= w.max_index, "{w:?}");
        assert!(w.max_index <= count, "{w:?} count={count}");
        if count > 0 {
            assert!(w.min_index < count);
        }
    }
}

#[test]
fn scrolling_back_reconstructs_the_window() {
    let size = ItemSize::new(100, 17);
    let viewport = ViewportSize::new(100, 240);
    let at = |y| compute_window(1_000, ScrollPosition::new(0, y), viewport, size, 1.5, 1);

    let original = at(3_210).unwrap();
    let forward = at(9_999).unwrap();
    assert_ne!(original.window, forward.window);
    assert_eq!(at(3_210).unwrap(), original);
}

#[test]
fn first_pass_creates_the_window() {
    let mut v = letters_engine(false, 20);
    let stats = scroll_to(&mut v, 0);
    assert_eq!(stats.misses, 2);
    assert_eq!(v.window(), Window::new(0, 2));
    assert_eq!(v.rendered_items(), &['A', 'B']);
    assert_eq!(attached(&v), vec!['A', 'B']);
    assert!(!v.rendering_in_progress());
}

#[test]
fn scroll_without_cache_destroys_moves_and_creates() {
    let mut v = letters_engine(false, 30);
    scroll_to(&mut v, 0);
    assert_eq!(attached(&v), vec!['A', 'B', 'C']);

    let stats = scroll_to(&mut v, 10);
    assert_eq!(v.window(), Window::new(1, 4));
    assert_eq!(stats.destroyed, 1);
    assert_eq!(stats.moves, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(attached(&v), vec!['B', 'C', 'D']);
    assert!(v.views().cached().is_empty());
}

#[test]
fn two_item_window_keeps_carried_view_in_place() {
    let mut v = letters_engine(false, 20);
    scroll_to(&mut v, 0);
    let log = v.factory().unwrap().log();
    log.borrow_mut().clear();

    let stats = scroll_to(&mut v, 10);
    assert_eq!(v.window(), Window::new(1, 3));
    assert_eq!((stats.destroyed, stats.moves, stats.misses), (1, 1, 1));
    assert_eq!(attached(&v), vec!['B', 'C']);

    // B was already last after A left: no move and no refresh for it.
    let b = v.views().rendered().get(&'B').unwrap().handle;
    let ops = log.borrow();
    assert!(!ops.iter().any(|op| matches!(op, Op::Move(h, _) if *h == b)));
    assert!(!ops.iter().any(|op| matches!(op, Op::Refresh(h, _, _) if *h == b)));
}

#[test]
fn scrolling_back_without_cache_is_a_miss() {
    let mut v = letters_engine(false, 30);
    scroll_to(&mut v, 0);
    scroll_to(&mut v, 10);
    let stats = scroll_to(&mut v, 0);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(attached(&v), vec!['A', 'B', 'C']);
    assert!(v.views().cached().is_empty());
}

#[test]
fn scrolling_back_with_unbounded_cache_is_a_hit() {
    let mut v = letters_engine(true, 30);
    scroll_to(&mut v, 0);
    let stats = scroll_to(&mut v, 10);
    assert_eq!(stats.cached, 1);
    assert!(v.views().cached().contains(&'A'));

    let stats = scroll_to(&mut v, 0);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 0);
    assert_eq!(attached(&v), vec!['A', 'B', 'C']);
    assert!(v.views().cached().contains(&'D'));
    assert!(!v.views().cached().contains(&'A'));
}

#[test]
fn cache_hit_reuses_the_same_handle() {
    let mut v = letters_engine(1usize, 20);
    scroll_to(&mut v, 0);
    let a = v.views().rendered().get(&'A').unwrap().handle;

    scroll_to(&mut v, 10);
    assert_eq!(v.views().cached().get(&'A').unwrap().handle, a);
    // Detached, not destroyed.
    assert_eq!(v.factory().unwrap().index_of(&a), None);

    scroll_to(&mut v, 0);
    assert_eq!(v.views().rendered().get(&'A').unwrap().handle, a);
    assert_eq!(v.factory().unwrap().index_of(&a), Some(0));
}

#[test]
fn eviction_scans_from_start_in_lower_half() {
    let mut pool: ViewPool<u32, u32, u32> = ViewPool::new();
    for i in [0u32, 2, 4, 6, 8] {
        pool.insert(ViewInfo::new(i, i, i as usize, i));
    }

    assert_eq!(scan_direction(5, 10), ScanDirection::FromStart);
    let evict = eviction_candidates(&pool, Window::new(5, 6), 1, 10, CacheLimit::Limited(4));
    assert_eq!(evict, vec![0]);
    let evict = eviction_candidates(&pool, Window::new(5, 6), 1, 10, CacheLimit::Limited(2));
    assert_eq!(evict, vec![0, 2, 4]);
}

#[test]
fn eviction_scans_from_end_in_upper_half() {
    let mut pool: ViewPool<u32, u32, u32> = ViewPool::new();
    for i in [0u32, 2, 4, 6, 8] {
        pool.insert(ViewInfo::new(i, i, i as usize, i));
    }

    assert_eq!(scan_direction(1, 10), ScanDirection::FromEnd);
    let evict = eviction_candidates(&pool, Window::new(1, 2), 1, 10, CacheLimit::Limited(4));
    assert_eq!(evict, vec![8]);
    let evict = eviction_candidates(&pool, Window::new(1, 2), 1, 10, CacheLimit::Limited(2));
    assert_eq!(evict, vec![8, 6, 4]);
}

#[test]
fn eviction_skips_entries_about_to_render() {
    let mut pool: ViewPool<u32, u32, u32> = ViewPool::new();
    for i in [0u32, 2, 4, 6, 8] {
        pool.insert(ViewInfo::new(i, i, i as usize, i));
    }
    // Window [0, 5) covers 0, 2 and 4; scanning from the end only 8 and 6 are eligible.
    let evict = eviction_candidates(&pool, Window::new(0, 5), 5, 10, CacheLimit::Limited(1));
    assert_eq!(evict, vec![8, 6]);

    assert!(eviction_candidates(&pool, Window::new(0, 5), 5, 10, CacheLimit::Unbounded).is_empty());
    assert!(eviction_candidates(&pool, Window::new(0, 5), 5, 10, CacheLimit::Limited(5)).is_empty());
}

#[test]
fn cache_limit_conversions() {
    assert_eq!(CacheLimit::from(true), CacheLimit::Unbounded);
    assert_eq!(CacheLimit::from(false), CacheLimit::Disabled);
    assert_eq!(CacheLimit::from(0usize), CacheLimit::Disabled);
    assert_eq!(CacheLimit::from(3usize), CacheLimit::Limited(3));
    assert!(!CacheLimit::Unbounded.is_exceeded(usize::MAX));
    assert!(CacheLimit::Disabled.is_exceeded(1));
    assert!(!CacheLimit::Limited(0).is_enabled());
}

fn numbers_engine(cache: CacheLimit) -> VirtualScroll<u32, MockContainer<u32>> {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(1.0)
        .with_view_cache_limit(cache);
    let mut v = VirtualScroll::with_factory(options, MockContainer::new());
    v.set_items((0..200).collect()).unwrap();
    v.set_viewport(ViewportSize::new(100, 50));
    v
}

fn assert_store_invariants(v: &VirtualScroll<u32, MockContainer<u32>>) {
    let views = v.views();
    for key in views.rendered().keys() {
        assert!(!views.cached().contains(key), "key {key} in both pools");
    }
    let factory = v.factory().unwrap();
    assert_eq!(factory.len(), views.rendered().len());
    assert_eq!(factory.len(), v.window().len());
    assert_eq!(factory.alive.len(), views.total());
    let w = v.window();
    assert!(w.min_index <= w.max_index && w.max_index <= v.item_count());
}

#[test]
fn random_scrolling_respects_cache_limit() {
    let mut v = numbers_engine(CacheLimit::Limited(7));
    let mut rng = Lcg::new(42);
    for _ in 0..300 {
        v.set_scroll_position(ScrollPosition::new(0, rng.gen_range_u64(0, 2_100)));
        v.update().unwrap();
        assert!(v.views().cached().len() <= 7);
        assert_store_invariants(&v);
        // Rendered views follow container order.
        let order: Vec<u32> = v.views().rendered().values().map(|view| view.item).collect();
        assert_eq!(order, v.factory().unwrap().attached_items());
    }
}

#[test]
fn random_scrolling_without_cache_never_caches() {
    let mut v = numbers_engine(CacheLimit::Disabled);
    let mut rng = Lcg::new(3);
    for _ in 0..300 {
        v.set_scroll_position(ScrollPosition::new(0, rng.gen_range_u64(0, 2_100)));
        v.update().unwrap();
        assert!(v.views().cached().is_empty());
        assert_store_invariants(&v);
    }
}

#[test]
fn random_scrolling_with_unbounded_cache_keeps_everything() {
    let mut v = numbers_engine(CacheLimit::Unbounded);
    let mut rng = Lcg::new(11);
    let mut seen = HashSet::new();
    for _ in 0..100 {
        v.set_scroll_position(ScrollPosition::new(0, rng.gen_range_u64(0, 2_100)));
        v.update().unwrap();
        seen.extend(v.rendered_items().iter().copied());
        assert_eq!(v.views().total(), seen.len());
        assert_store_invariants(&v);
    }
}

#[test]
fn unchanged_window_skips_the_pass() {
    let mut v = letters_engine(false, 25);
    scroll_to(&mut v, 0);
    assert_eq!(v.window(), Window::new(0, 3));
    v.set_scroll_position(ScrollPosition::new(0, 3));
    assert_eq!(v.update().unwrap(), UpdateOutcome::Unchanged);
    assert_eq!(v.passes(), 1);
}

#[test]
fn missing_factory_is_a_configuration_error() {
    let options = VirtualScrollOptions::new().with_item_size(ItemSize::new(10, 10));
    let mut v: VirtualScroll<char, MockContainer<char>> = VirtualScroll::new(options);
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(10, 20));
    assert_eq!(v.update(), Err(Error::MissingViewFactory));
    assert!(!v.rendering_in_progress());

    v.attach_factory(MockContainer::new()).unwrap();
    assert!(matches!(v.update(), Ok(UpdateOutcome::Rendered(_))));
}

fn async_engine() -> (VirtualScroll<char, MockContainer<char>>, Rc<Cell<u32>>) {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(0.0)
        .with_async_rendering(true);
    let mut v = VirtualScroll::with_factory(options, MockContainer::new());
    let placeholders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&placeholders);
    v.set_placeholder_factory(move |_: &char, _: usize| {
        counter.set(counter.get() + 1);
        1_000 + counter.get()
    });
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));
    (v, placeholders)
}

#[test]
fn async_first_pass_is_synchronous() {
    let (mut v, placeholders) = async_engine();
    scroll_to(&mut v, 0);
    assert_eq!(placeholders.get(), 0);
    assert!(!v.rendering_in_progress());
    assert_eq!(attached(&v), vec!['A', 'B']);
}

#[test]
fn async_miss_shows_placeholder_until_flushed() {
    let (mut v, placeholders) = async_engine();
    scroll_to(&mut v, 0);

    let stats = scroll_to(&mut v, 10);
    assert_eq!(stats.deferred, 1);
    assert_eq!(placeholders.get(), 1);
    assert!(v.rendering_in_progress());
    assert_eq!(v.pending_deferred(), 1);

    // The placeholder holds C's slot at the end of the container.
    let c = v.views().rendered().get(&'C').unwrap();
    assert!(c.placeholder);
    assert_eq!(c.handle, 1_001);
    assert_eq!(v.factory().unwrap().index_of(&1_001), Some(1));

    // No new pass starts while the deferred creation is pending.
    v.set_scroll_position(ScrollPosition::new(0, 30));
    assert_eq!(v.update().unwrap(), UpdateOutcome::Busy);
    assert!(v.rendering_in_progress());

    assert_eq!(v.flush_deferred().unwrap(), 1);
    assert!(!v.rendering_in_progress());
    let c = v.views().rendered().get(&'C').unwrap();
    assert!(!c.placeholder);
    assert_ne!(c.handle, 1_001);
    assert_eq!(v.factory().unwrap().index_of(&c.handle), Some(1));
    assert_eq!(v.factory().unwrap().index_of(&1_001), None);
    assert_eq!(attached(&v), vec!['B', 'C']);

    // The dropped request is picked up by the next update.
    assert!(matches!(v.update().unwrap(), UpdateOutcome::Rendered(_)));
    assert_eq!(v.window(), Window::new(3, 5));
}

#[test]
fn async_without_placeholder_factory_fails_after_first_pass() {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(0.0)
        .with_async_rendering(true);
    let mut v = VirtualScroll::with_factory(options, MockContainer::new());
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));
    assert!(v.update().is_ok());

    v.set_scroll_position(ScrollPosition::new(0, 10));
    assert_eq!(v.update(), Err(Error::MissingPlaceholderFactory));
}

#[test]
fn reference_view_is_measured_before_the_first_window() {
    let options = VirtualScrollOptions::new().with_buffer_length(0.0);
    let factory = MockContainer::new().with_item_size(ItemSize::new(100, 10));
    let mut v = VirtualScroll::with_factory(options, factory);
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));

    assert!(v.needs_measurement());
    assert_eq!(v.update().unwrap(), UpdateOutcome::NotReady);
    assert!(v.render_reference().unwrap());
    assert_eq!(attached(&v), vec!['A']);
    assert!(!v.render_reference().unwrap());

    assert_eq!(v.measure_reference(), Some(ItemSize::new(100, 10)));
    let stats = match v.update().unwrap() {
        UpdateOutcome::Rendered(stats) => stats,
        other => panic!("{other:?}"),
    };
    assert_eq!((stats.moves, stats.misses), (1, 1));
    assert_eq!(attached(&v), vec!['A', 'B']);
    assert_eq!(v.reference_size(), Some(ItemSize::new(100, 10)));
}

#[test]
fn invalidated_size_is_remeasured_from_a_rendered_view() {
    let options = VirtualScrollOptions::new().with_buffer_length(0.0);
    let factory = MockContainer::new().with_item_size(ItemSize::new(100, 10));
    let mut v = VirtualScroll::with_factory(options, factory);
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));
    v.render_reference().unwrap();
    v.measure_reference().unwrap();
    v.update().unwrap();

    v.invalidate_item_size();
    assert_eq!(v.update().unwrap(), UpdateOutcome::NotReady);
    // Views stay rendered, so no reference pass is needed.
    assert!(!v.render_reference().unwrap());
    assert!(v.measure_reference().is_some());
    assert_eq!(v.update().unwrap(), UpdateOutcome::Unchanged);
}

#[test]
fn grid_mode_change_invalidates_measurement() {
    let options = VirtualScrollOptions::new().with_buffer_length(0.0);
    let factory = MockContainer::new().with_item_size(ItemSize::new(100, 10));
    let mut v = VirtualScroll::with_factory(options, factory);
    v.set_items(('a'..='z').collect()).unwrap();
    v.set_viewport(ViewportSize::new(300, 20));
    v.render_reference().unwrap();
    v.measure_reference().unwrap();
    v.update().unwrap();
    assert_eq!(v.window(), Window::new(0, 2));

    v.update_options(|o| o.grid_list = true).unwrap();
    assert!(v.needs_measurement());
    v.measure_reference().unwrap();
    assert_eq!(v.items_per_row(), 3);
    v.update().unwrap();
    assert_eq!(v.window(), Window::new(0, 6));
}

#[test]
fn new_track_by_destroys_every_view() {
    let mut v = letters_engine(true, 20);
    scroll_to(&mut v, 0);
    scroll_to(&mut v, 20);
    assert!(!v.views().cached().is_empty());
    let log = v.factory().unwrap().log();

    v.set_track_by(|i, c: &char| char::from_u32(*c as u32 + i as u32).unwrap_or(*c))
        .unwrap();
    assert_eq!(v.views().total(), 0);
    assert_eq!(v.factory().unwrap().len(), 0);
    let destroyed = log
        .borrow()
        .iter()
        .filter(|op| matches!(op, Op::Destroy(_)))
        .count();
    let created = log
        .borrow()
        .iter()
        .filter(|op| matches!(op, Op::Create(..)))
        .count();
    assert_eq!(destroyed, created);
}

#[test]
fn set_items_releases_views_and_rerenders() {
    let mut v = letters_engine(true, 20);
    scroll_to(&mut v, 0);
    scroll_to(&mut v, 20);
    v.set_items(vec!['X', 'Y', 'Z']).unwrap();
    assert_eq!(v.views().total(), 0);
    assert_eq!(v.window(), Window::default());

    v.set_scroll_position(ScrollPosition::new(0, 0));
    v.update().unwrap();
    assert_eq!(attached(&v), vec!['X', 'Y']);
}

#[test]
fn drop_destroys_each_view_once() {
    let mut v = letters_engine(true, 20);
    scroll_to(&mut v, 0);
    scroll_to(&mut v, 30);
    let log = v.factory().unwrap().log();
    drop(v);

    let ops = log.borrow();
    let created: HashSet<u32> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Create(id, ..) => Some(*id),
            _ => None,
        })
        .collect();
    let destroyed: Vec<u32> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Destroy(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed.len(), created.len());
    assert_eq!(destroyed.iter().copied().collect::<HashSet<_>>(), created);
}

#[test]
fn colliding_keys_share_a_view_without_panicking() {
    let options = VirtualScrollOptions::new_with_key(|_, _: &char| 0u8)
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(0.0);
    let mut v = VirtualScroll::with_factory(options, MockContainer::new());
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));
    v.update().unwrap();

    assert_eq!(v.views().rendered().len(), 1);
    assert_eq!(v.factory().unwrap().len(), 1);
    // Last write wins.
    assert_eq!(v.views().rendered().get(&0).unwrap().item, 'B');
}

#[derive(Default)]
struct CountingStrategy {
    inner: DefaultStrategy,
    rendered: usize,
    unrendered: usize,
}

impl<T, K, F> ViewLifecycleStrategy<T, K, F> for CountingStrategy
where
    T: Clone,
    K: ViewKey,
    F: ViewFactory<T>,
{
    fn destroy_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool {
        self.inner.destroy_view(cx, key)
    }

    fn cache_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool {
        self.inner.cache_view(cx, key)
    }

    fn unrender_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Unrendered {
        self.unrendered += 1;
        // Never cache.
        self.inner.destroy_view(cx, key);
        Unrendered::Destroyed
    }

    fn render_view_for_item(
        &mut self,
        cx: &mut RenderContext<'_, T, K, F>,
        key: K,
        item: &T,
        index: usize,
        defer: bool,
    ) -> Result<RenderedView> {
        self.rendered += 1;
        self.inner.render_view_for_item(cx, key, item, index, defer)
    }

    fn complete_deferred(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Result<bool> {
        self.inner.complete_deferred(cx, key)
    }

    fn purge_view_cache(&mut self, cx: &mut RenderContext<'_, T, K, F>) -> usize {
        self.inner.purge_view_cache(cx)
    }
}

#[test]
fn custom_strategy_can_be_injected() {
    let options = VirtualScrollOptions::new()
        .with_item_size(ItemSize::new(100, 10))
        .with_buffer_length(0.0)
        .with_view_cache_limit(true);
    let mut v = VirtualScroll::with_strategy(options, CountingStrategy::default());
    v.attach_factory(MockContainer::new()).unwrap();
    v.set_items(LETTERS.to_vec()).unwrap();
    v.set_viewport(ViewportSize::new(100, 20));
    v.update().unwrap();
    v.set_scroll_position(ScrollPosition::new(0, 30));
    v.update().unwrap();

    assert_eq!(v.strategy().rendered, 4);
    assert_eq!(v.strategy().unrendered, 2);
    // The strategy overrides the configured cache.
    assert!(v.views().cached().is_empty());
}

#[test]
fn frame_state_round_trips_measurement() {
    let options = VirtualScrollOptions::new().with_buffer_length(0.0);
    let factory = MockContainer::new().with_item_size(ItemSize::new(100, 10));
    let mut v1 = VirtualScroll::with_factory(options.clone(), factory);
    v1.set_items(LETTERS.to_vec()).unwrap();
    v1.set_viewport(ViewportSize::new(100, 20));
    v1.set_scroll_position(ScrollPosition::new(0, 20));
    v1.render_reference().unwrap();
    v1.measure_reference().unwrap();
    v1.update().unwrap();
    let frame = v1.frame_state();
    assert_eq!(frame.window.geometry.window, Window::new(2, 4));

    let mut v2 = VirtualScroll::with_factory(options, MockContainer::new());
    v2.set_items(LETTERS.to_vec()).unwrap();
    v2.restore_frame_state(frame);
    assert!(!v2.needs_measurement());
    v2.update().unwrap();
    assert_eq!(v2.window(), Window::new(2, 4));
    assert_eq!(v2.rendered_items(), &['C', 'D']);
}
