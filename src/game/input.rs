//! Input Frames and Recording
//!
//! The core consumes normalized, edge-triggered inputs: one `InputFrame` per
//! tick saying whether a turn, jump or slide was pressed on that tick.
//! `PlayerInputBuffer` records a run's inputs delta-compressed so the run can
//! be replayed and verified.

use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Inputs pressed during a single tick.
///
/// Recorded runs store the tick next to the frame, not inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Turn request: -1 left, +1 right, 0 none
    pub turn: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Jump
    /// - Bit 1: Slide
    pub flags: u8,
}

impl InputFrame {
    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x01;

    /// Slide flag bit
    pub const FLAG_SLIDE: u8 = 0x02;

    /// Nothing pressed.
    pub const fn idle() -> Self {
        Self { turn: 0, flags: 0 }
    }

    /// Turn left this tick.
    pub const fn turn_left() -> Self {
        Self { turn: -1, flags: 0 }
    }

    /// Turn right this tick.
    pub const fn turn_right() -> Self {
        Self { turn: 1, flags: 0 }
    }

    /// Jump this tick.
    pub const fn jump() -> Self {
        Self { turn: 0, flags: Self::FLAG_JUMP }
    }

    /// Slide this tick.
    pub const fn slide() -> Self {
        Self { turn: 0, flags: Self::FLAG_SLIDE }
    }

    /// Jump pressed this tick.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Slide pressed this tick.
    #[inline]
    pub fn slide_pressed(&self) -> bool {
        self.flags & Self::FLAG_SLIDE != 0
    }

    /// Nothing pressed and no turn requested.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.turn == 0 && self.flags == 0
    }
}

/// Tick at which the recorded input changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// First tick with the new frame
    pub tick: u32,
    /// The new frame
    pub frame: InputFrame,
}

// =============================================================================
// INPUT BUFFER
// =============================================================================

/// Complete input recording for one run.
///
/// Every tick must be recorded, idle ones included, so that a press lasts
/// exactly one tick on replay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerInputBuffer {
    /// Run identifier
    pub run_id: [u8; 16],

    /// Track seed used for this run
    pub rng_seed: u64,

    /// Starting tick (usually 0)
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    /// Delta-compressed input data.
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl PlayerInputBuffer {
    /// Create an empty recording.
    pub fn new(run_id: [u8; 16], rng_seed: u64) -> Self {
        Self {
            run_id,
            rng_seed,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::idle(),
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Finalize the buffer (call at run end).
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = end_tick;
    }

    /// Frames for every tick from `start_tick` through `end_tick`.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            buffer: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::idle(),
        }
    }

    /// Serialize to bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from bincode.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        let mut buffer: Self = bincode::deserialize(data)?;
        buffer.last_frame = buffer.deltas.last().map(|d| d.frame).unwrap_or_default();
        Ok(buffer)
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    buffer: &'a PlayerInputBuffer,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.buffer.end_tick {
            return None;
        }

        while let Some(delta) = self.buffer.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_frame_flags() {
        assert!(InputFrame::idle().is_idle());
        assert!(InputFrame::jump().jump_pressed());
        assert!(!InputFrame::jump().slide_pressed());
        assert!(InputFrame::slide().slide_pressed());
        assert!(!InputFrame::turn_left().is_idle());

        let both = InputFrame {
            turn: 0,
            flags: InputFrame::FLAG_JUMP | InputFrame::FLAG_SLIDE,
        };
        assert!(both.jump_pressed() && both.slide_pressed());
        assert_eq!(InputFrame::turn_left().turn, -1);
        assert_eq!(InputFrame::turn_right().turn, 1);
    }

    #[test]
    fn test_input_buffer_delta_compression() {
        let mut buffer = PlayerInputBuffer::new([0u8; 16], 12345);

        for tick in 0..10 {
            buffer.record(tick, InputFrame::idle());
        }
        assert_eq!(buffer.delta_count(), 0);

        // A press and its release are two deltas
        buffer.record(10, InputFrame::jump());
        buffer.record(11, InputFrame::idle());
        buffer.record(12, InputFrame::idle());
        assert_eq!(buffer.delta_count(), 2);
        assert_eq!(buffer.end_tick, 12);
    }

    #[test]
    fn test_replay_iterator() {
        let mut buffer = PlayerInputBuffer::new([0u8; 16], 12345);
        buffer.record(0, InputFrame::idle());
        buffer.record(2, InputFrame::turn_right());
        buffer.record(3, InputFrame::idle());
        buffer.finalize(5);

        let frames: Vec<_> = buffer.replay_iter().collect();

        assert_eq!(frames.len(), 6);
        assert_eq!(frames.iter().filter(|(_, f)| !f.is_idle()).count(), 1);
        assert_eq!(frames[2], (2, InputFrame::turn_right()));
    }

    #[test]
    fn test_replay_iterator_holds_last_frame() {
        let mut buffer = PlayerInputBuffer::new([0u8; 16], 12345);
        buffer.record(10, InputFrame::turn_left());
        buffer.record(11, InputFrame::idle());
        buffer.record(30, InputFrame::slide());
        buffer.finalize(40);

        let frames: Vec<_> = buffer.replay_iter().map(|(_, f)| f).collect();

        assert_eq!(frames.len(), 41);
        assert!(frames[5].is_idle());
        assert_eq!(frames[10], InputFrame::turn_left());
        assert!(frames[20].is_idle());
        assert_eq!(frames[30], InputFrame::slide());
        assert_eq!(frames[40], InputFrame::slide());
    }

    #[test]
    fn test_bytes_round_trip_keeps_recording_state() {
        let mut buffer = PlayerInputBuffer::new([7u8; 16], 99);
        buffer.record(4, InputFrame::jump());
        buffer.record(5, InputFrame::idle());

        let mut restored = PlayerInputBuffer::from_bytes(&buffer.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, buffer);

        // Continuing to record idle does not add a spurious delta
        restored.record(6, InputFrame::idle());
        assert_eq!(restored.delta_count(), 2);
    }
}
