// Example: an adapter event loop with async view creation and a measured item size.
use std::cell::Cell;
use std::rc::Rc;

use virtual_scroll::{ItemSize, ScrollPosition, ViewFactory, ViewportSize, VirtualScrollOptions};
use virtual_scroll_adapter::{ContainerOwnership, Coordinator, ScrollContainer};

#[derive(Default)]
struct Cards {
    next_id: u32,
    attached: Vec<u32>,
}

impl ViewFactory<&'static str> for Cards {
    type Handle = u32;

    fn create(&mut self, _item: &&'static str, _index: usize, position: Option<usize>) -> u32 {
        self.next_id += 1;
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, self.next_id);
        self.next_id
    }

    fn destroy(&mut self, handle: u32) {
        self.attached.retain(|&h| h != handle);
    }

    fn move_to(&mut self, handle: &u32, position: usize) {
        self.attached.retain(|h| h != handle);
        let at = position.min(self.attached.len());
        self.attached.insert(at, *handle);
    }

    fn detach(&mut self, handle: &u32) {
        self.attached.retain(|h| h != handle);
    }

    fn insert(&mut self, handle: &u32, position: Option<usize>) {
        let at = position.unwrap_or(self.attached.len()).min(self.attached.len());
        self.attached.insert(at, *handle);
    }

    fn index_of(&self, handle: &u32) -> Option<usize> {
        self.attached.iter().position(|h| h == handle)
    }

    fn len(&self) -> usize {
        self.attached.len()
    }

    fn refresh(&mut self, _handle: &u32, _item: &&'static str, _index: usize) {}

    fn measure(&self, handle: &u32) -> Option<ItemSize> {
        self.attached.contains(handle).then_some(ItemSize::new(300, 48))
    }
}

/// A scroll container whose offset is shared with the simulated host.
struct Viewport {
    y: Rc<Cell<u64>>,
}

impl ScrollContainer for Viewport {
    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::new(0, self.y.get())
    }

    fn client_size(&self) -> ViewportSize {
        ViewportSize::new(300, 480)
    }

    fn set_native_scrolling(&mut self, enabled: bool) {
        println!("native scrolling: {enabled}");
    }
}

const WORDS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn main() -> virtual_scroll_adapter::Result<()> {
    let options: VirtualScrollOptions<&'static str> = VirtualScrollOptions::new()
        .with_async_rendering(true)
        .with_view_cache_limit(32usize);
    let mut c = Coordinator::new(options, Cards::default());
    let mut placeholder_id = 1_000_000;
    c.engine_mut()
        .set_placeholder_factory(move |_: &&'static str, _: usize| {
            placeholder_id += 1;
            placeholder_id
        });

    let y = Rc::new(Cell::new(0));
    c.attach_container(
        Box::new(Viewport { y: Rc::clone(&y) }),
        ContainerOwnership::Owned,
    )?;
    c.set_items((0..2_000).map(|i| WORDS[i % WORDS.len()]).collect())?;

    // One turn to measure the reference card.
    c.run_until_idle(0)?;
    println!("item size: {:?}", c.engine().item_size());

    // A fling: scroll events every 16 ms, ticks in between.
    for frame in 0..30u64 {
        let now = frame * 16;
        y.set(frame * 120);
        c.on_scroll(ScrollPosition::new(0, y.get()), now)?;
        let phase = c.tick(now + 8)?;
        println!(
            "t={now:3} y={:5} window={:?} pending={} {phase:?}",
            y.get(),
            c.engine().window(),
            c.engine().pending_deferred()
        );
    }

    // Let the trailing event and the post-pass re-check land.
    let mut now = 30 * 16;
    while c.has_pending_work() {
        now += 16;
        c.tick(now)?;
    }
    println!(
        "settled at t={now}: window={:?} cached={}",
        c.engine().window(),
        c.engine().views().cached().len()
    );
    Ok(())
}
