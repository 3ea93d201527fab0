/// Total ramp duration for a stat counter.
pub const COUNTER_DURATION_MS: f64 = 2000.0;
/// Approximate interval between animation frames.
pub const COUNTER_STEP_MS: u32 = 16;

/// One DOM write for a counter element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFrame {
    pub label: String,
    pub done: bool,
}

/// Linear ramp from zero to `target` in ~16ms steps. Labels are floored on
/// the way up, so the sequence is monotonically non-decreasing, and the final
/// frame snaps exactly to `"{target}+"`. After the final frame `tick`
/// returns `None`; the caller must stop writing.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: u64,
    current: f64,
    increment: f64,
    done: bool,
}

impl CounterAnimation {
    pub fn new(target: u64) -> Self {
        Self {
            target,
            current: 0.0,
            increment: target as f64 / (COUNTER_DURATION_MS / f64::from(COUNTER_STEP_MS)),
            done: false,
        }
    }

    pub fn tick(&mut self) -> Option<CounterFrame> {
        if self.done {
            return None;
        }
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.done = true;
            return Some(CounterFrame {
                label: format!("{}+", self.target),
                done: true,
            });
        }
        Some(CounterFrame {
            label: format!("{}+", self.current.floor() as u64),
            done: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(target: u64) -> Vec<CounterFrame> {
        let mut animation = CounterAnimation::new(target);
        let mut frames = Vec::new();
        while let Some(frame) = animation.tick() {
            frames.push(frame);
        }
        frames
    }

    fn label_value(frame: &CounterFrame) -> Result<u64, String> {
        frame
            .label
            .strip_suffix('+')
            .ok_or_else(|| format!("label {:?} missing suffix", frame.label))?
            .parse()
            .map_err(|error| format!("label {:?}: {error}", frame.label))
    }

    #[test]
    fn ramp_ends_exactly_on_target() -> Result<(), String> {
        let frames = run_to_completion(150);
        let last = frames.last().ok_or("no frames")?;
        assert_eq!(last.label, "150+");
        assert!(last.done);
        Ok(())
    }

    #[test]
    fn labels_never_decrease() -> Result<(), String> {
        let frames = run_to_completion(150);
        let mut previous = 0;
        for frame in &frames {
            let value = label_value(frame)?;
            assert!(value >= previous, "dropped from {previous} to {value}");
            previous = value;
        }
        Ok(())
    }

    #[test]
    fn no_frames_after_completion() {
        let mut animation = CounterAnimation::new(7);
        while animation.tick().is_some() {}
        assert!(animation.tick().is_none());
        assert!(animation.tick().is_none());
    }

    #[test]
    fn ramp_spans_roughly_two_seconds_of_frames() {
        // 2000ms / 16ms = 125 steps; the final snap lands on or before that.
        let frames = run_to_completion(1000);
        assert!(frames.len() <= 125);
        assert!(frames.len() >= 120);
    }

    #[test]
    fn zero_target_finishes_immediately() {
        let frames = run_to_completion(0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].label, "0+");
        assert!(frames[0].done);
    }
}
