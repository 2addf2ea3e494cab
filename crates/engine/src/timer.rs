use tracing::trace;

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    remaining_frames: u32,
    payload: T,
}

/// Fixed-capacity set of frame-counted timers. Each timer carries a payload
/// that is handed back when the timer fires; the owner decides what firing
/// means, so no callback captures game state.
#[derive(Debug, Clone)]
pub struct TimerSet<T> {
    timers: Vec<PendingTimer<T>>,
    capacity: usize,
}

impl<T> TimerSet<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timers: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Schedules `payload` to fire after `frames` calls to [`step`](Self::step).
    /// Returns `false` and drops the payload when the set is full.
    pub fn after(&mut self, frames: u32, payload: T) -> bool {
        if self.timers.len() >= self.capacity {
            trace!(capacity = self.capacity, "timer_set_saturated");
            return false;
        }
        self.timers.push(PendingTimer {
            remaining_frames: frames.max(1),
            payload,
        });
        true
    }

    /// Advances every timer by one frame and moves fired payloads into
    /// `fired` in scheduling order.
    pub fn step(&mut self, fired: &mut Vec<T>) {
        let mut index = 0;
        while index < self.timers.len() {
            let timer = &mut self.timers[index];
            timer.remaining_frames -= 1;
            if timer.remaining_frames == 0 {
                fired.push(self.timers.remove(index).payload);
            } else {
                index += 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
