/*!
 * Tick Pacing
 * What the controller does between ticks
 */

/// Called once after every tick
pub trait TickPacer {
    fn pace(&mut self);
}

/// Run ticks back to back
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl TickPacer for NoPacing {
    #[inline]
    fn pace(&mut self) {}
}

/// Give up the CPU between ticks so workers on the same core make progress
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldPacing;

impl TickPacer for YieldPacing {
    #[inline]
    fn pace(&mut self) {
        std::thread::yield_now();
    }
}

/// Closure-backed pacer for tests and tools
pub struct FnPacer<F: FnMut()>(pub F);

impl<F: FnMut()> TickPacer for FnPacer<F> {
    fn pace(&mut self) {
        (self.0)()
    }
}

impl<P: TickPacer + ?Sized> TickPacer for &mut P {
    fn pace(&mut self) {
        (**self).pace()
    }
}
