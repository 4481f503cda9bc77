use virtual_scroll::{
    DefaultStrategy, ScrollPosition, UpdateOutcome, ViewFactory, ViewKey, ViewLifecycleStrategy,
    ViewportSize, VirtualScroll, VirtualScrollOptions,
};

use crate::{ContainerOwnership, Error, Result, ScrollContainer, Throttle};

/// Whether the coordinator can start a new recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Idle,
    /// A render pass (or the measurement of a reference view) has not settled yet.
    Rendering,
}

struct Attached {
    container: Box<dyn ScrollContainer>,
    ownership: ContainerOwnership,
}

/// A framework-neutral coordinator that wraps a [`VirtualScroll`] engine and serializes the
/// recomputations triggered by scroll, resize and item changes.
///
/// Adapters drive it by calling:
/// - `on_scroll` / `on_resize` / `set_items` when UI events occur
/// - `tick(now_ms)` once per task-queue turn, to complete deferred view creations, measure
///   reference views and deliver trailing scroll events
///
/// Requests that arrive while a pass is settling are not queued; the coordinator re-checks the
/// latest state once the pass is done.
pub struct Coordinator<T, F: ViewFactory<T>, K = T, S = DefaultStrategy> {
    v: VirtualScroll<T, F, K, S>,
    container: Option<Attached>,
    throttle: Throttle,
    latest: Option<ScrollPosition>,
    dirty: bool,
    measure_pending: bool,
    pass_position: ScrollPosition,
    recheck_at: Option<u64>,
    now_ms: u64,
}

impl<T, F, K> Coordinator<T, F, K, DefaultStrategy>
where
    T: Clone,
    F: ViewFactory<T>,
    K: ViewKey,
{
    pub fn new(options: VirtualScrollOptions<T, K>, factory: F) -> Self {
        Self::from_engine(VirtualScroll::with_factory(options, factory))
    }
}

impl<T, F, K, S> Coordinator<T, F, K, S>
where
    T: Clone,
    F: ViewFactory<T>,
    K: ViewKey,
    S: ViewLifecycleStrategy<T, K, F>,
{
    pub fn from_engine(v: VirtualScroll<T, F, K, S>) -> Self {
        let throttle = Throttle::new(v.options().scroll_debounce_ms);
        Self {
            v,
            container: None,
            throttle,
            latest: None,
            dirty: false,
            measure_pending: false,
            pass_position: ScrollPosition::default(),
            recheck_at: None,
            now_ms: 0,
        }
    }

    pub fn engine(&self) -> &VirtualScroll<T, F, K, S> {
        &self.v
    }

    /// Direct access to the engine. Changes made here are picked up by the next
    /// [`Coordinator::check_scroll`].
    pub fn engine_mut(&mut self) -> &mut VirtualScroll<T, F, K, S> {
        &mut self.v
    }

    /// Detaches any container and returns the engine.
    pub fn into_engine(mut self) -> VirtualScroll<T, F, K, S> {
        self.detach_container();
        self.v
    }

    pub fn phase(&self) -> Phase {
        if self.v.rendering_in_progress() || self.measure_pending {
            Phase::Rendering
        } else {
            Phase::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// `true` while anything is left for a later `tick`: an unsettled pass, a trailing scroll
    /// event or a scheduled re-check.
    pub fn has_pending_work(&self) -> bool {
        !self.is_idle() || self.throttle.has_trailing() || self.recheck_at.is_some()
    }

    /// Whether hosts should listen for scroll events in the capture phase.
    pub fn event_capture(&self) -> bool {
        self.v.options().event_capture
    }

    /// Attaches the scroll container and renders for its current position and size.
    pub fn attach_container(
        &mut self,
        mut container: Box<dyn ScrollContainer>,
        ownership: ContainerOwnership,
    ) -> Result<()> {
        if self.container.is_some() {
            return Err(Error::ContainerAttached);
        }
        if ownership == ContainerOwnership::Owned {
            container.set_native_scrolling(true);
        }
        let position = container.scroll_position();
        let size = container.client_size();
        vdebug!(?ownership, y = position.y, height = size.height, "attach_container");
        self.container = Some(Attached {
            container,
            ownership,
        });
        self.v.set_viewport(size);
        self.v.set_scroll_position(position);
        self.throttle.reset();
        self.recompute()
    }

    /// Detaches the scroll container, restoring its styling if the list owned it.
    pub fn detach_container(&mut self) -> Option<Box<dyn ScrollContainer>> {
        let Attached {
            mut container,
            ownership,
        } = self.container.take()?;
        if ownership == ContainerOwnership::Owned {
            container.set_native_scrolling(false);
        }
        self.recheck_at = None;
        Some(container)
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// Feeds a scroll event. Throttled with `scroll_debounce_ms` (leading and trailing).
    pub fn on_scroll(&mut self, position: ScrollPosition, now_ms: u64) -> Result<()> {
        self.now_ms = now_ms;
        self.latest = Some(position);
        self.throttle.set_interval_ms(self.v.options().scroll_debounce_ms);
        if self.throttle.on_event(now_ms) {
            vtrace!(y = position.y, "on_scroll: leading");
            return self.apply_latest();
        }
        vtrace!(y = position.y, "on_scroll: throttled");
        Ok(())
    }

    /// Feeds a container resize. Not throttled.
    pub fn on_resize(&mut self, size: ViewportSize) -> Result<()> {
        if !self.v.set_viewport(size) {
            return Ok(());
        }
        vtrace!(width = size.width, height = size.height, "on_resize");
        self.recompute()
    }

    /// Replaces the items and renders the new window.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<()> {
        self.v.set_items(items)?;
        self.recompute()
    }

    /// Switches between list and grid layout. The item size is measured again.
    pub fn set_grid_list(&mut self, grid_list: bool) -> Result<()> {
        if self.v.options().grid_list == grid_list {
            return Ok(());
        }
        self.v.update_options(|o| o.grid_list = grid_list)?;
        self.recompute()
    }

    /// Forgets the item size and measures a rendered view before the next window computation.
    pub fn invalidate_item_size(&mut self) -> Result<()> {
        self.v.invalidate_item_size();
        self.recompute()
    }

    /// Re-checks the window at `position`, or at the last known position, bypassing the
    /// scroll throttle.
    pub fn check_scroll(&mut self, position: Option<ScrollPosition>) -> Result<()> {
        if let Some(position) = position.or(self.latest) {
            self.latest = Some(position);
            self.v.set_scroll_position(position);
        }
        self.recompute()
    }

    /// Advances the coordinator by one task-queue turn.
    pub fn tick(&mut self, now_ms: u64) -> Result<Phase> {
        self.now_ms = now_ms;

        if self.v.rendering_in_progress() {
            self.v.flush_deferred()?;
            self.schedule_recheck();
            if self.dirty {
                self.recompute()?;
            }
            return Ok(self.phase());
        }

        if self.measure_pending {
            self.measure_pending = false;
            if self.v.measure_reference().is_some() {
                self.recompute()?;
            } else {
                vdebug!("tick: reference view not measurable yet");
            }
            return Ok(self.phase());
        }

        if self.dirty {
            self.recompute()?;
        }

        if self.throttle.poll(now_ms) {
            vtrace!("tick: trailing scroll");
            self.apply_latest()?;
        }

        if self.recheck_at.is_some_and(|at| now_ms >= at) && self.is_idle() {
            self.recheck_at = None;
            self.recheck()?;
        }

        Ok(self.phase())
    }

    /// Ticks at `now_ms` until the current pass has settled. Returns the number of turns taken.
    pub fn run_until_idle(&mut self, now_ms: u64) -> Result<usize> {
        let mut turns = 0;
        while !self.is_idle() {
            self.tick(now_ms)?;
            turns += 1;
        }
        Ok(turns)
    }

    fn apply_latest(&mut self) -> Result<()> {
        if let Some(position) = self.latest {
            self.v.set_scroll_position(position);
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Result<()> {
        if !self.is_idle() {
            self.dirty = true;
            return Ok(());
        }
        self.dirty = false;
        match self.v.update()? {
            UpdateOutcome::Rendered(_) => {
                self.pass_position = self.v.scroll_position();
                vdebug!(
                    min = self.v.min_index(),
                    max = self.v.max_index(),
                    deferred = self.v.pending_deferred(),
                    "recompute: rendered"
                );
                if !self.v.rendering_in_progress() {
                    self.schedule_recheck();
                }
            }
            UpdateOutcome::NotReady => {
                // Measured on the next turn.
                if self.v.render_reference()? || !self.v.views().rendered().is_empty() {
                    self.measure_pending = true;
                }
            }
            UpdateOutcome::Busy => self.dirty = true,
            UpdateOutcome::Unchanged => {}
        }
        Ok(())
    }

    fn schedule_recheck(&mut self) {
        let delay = self.v.options().scroll_debounce_ms.saturating_mul(2);
        self.recheck_at = Some(self.now_ms.saturating_add(delay));
    }

    /// Catches up with scrolling that happened while the last pass was running.
    fn recheck(&mut self) -> Result<()> {
        let live = self
            .container
            .as_ref()
            .map(|a| a.container.scroll_position());
        let moved = live.is_some_and(|p| p != self.pass_position);
        let blank = self.v.views().rendered().is_empty() && self.v.item_count() > 0;
        if !moved && !blank {
            return Ok(());
        }
        vdebug!(moved, blank, "recheck");
        if let Some(position) = live {
            self.latest = Some(position);
            self.v.set_scroll_position(position);
        }
        self.recompute()
    }
}

impl<T, F: ViewFactory<T>, K, S> core::fmt::Debug for Coordinator<T, F, K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Coordinator")
            .field("engine", &self.v)
            .field("has_container", &self.container.is_some())
            .field("throttle", &self.throttle)
            .field("dirty", &self.dirty)
            .field("measure_pending", &self.measure_pending)
            .field("recheck_at", &self.recheck_at)
            .finish_non_exhaustive()
    }
}
