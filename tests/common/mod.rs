//! Shared test doubles: a recording LED and a virtual clock on one timeline.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use morse_writer::player::{CancelToken, Clock, Transducer, DOT_TIME_US};
use morse_writer::TranscriptBuffer;

/// Something the player did to the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    On,
    Off,
    Wait(u32),
}

#[derive(Default)]
struct Inner {
    now: i64,
    events: Vec<(i64, Event)>,
}

/// Timeline shared by a [`RecordingLed`] and a [`VirtualClock`].
#[derive(Clone, Default)]
pub struct Timeline(Rc<RefCell<Inner>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn led(&self) -> RecordingLed {
        RecordingLed {
            timeline: self.clone(),
            lit: false,
        }
    }

    pub fn clock(&self) -> VirtualClock {
        VirtualClock {
            timeline: self.clone(),
        }
    }

    pub fn now(&self) -> i64 {
        self.0.borrow().now
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.iter().map(|&(_, e)| e).collect()
    }

    pub fn timed_events(&self) -> Vec<(i64, Event)> {
        self.0.borrow().events.clone()
    }

    fn record(&self, event: Event) {
        let mut inner = self.0.borrow_mut();
        let now = inner.now;
        inner.events.push((now, event));
        if let Event::Wait(us) = event {
            inner.now += us as i64;
        }
    }

    /// Key-down durations in order.
    pub fn holds(&self) -> Vec<i64> {
        let mut holds = Vec::new();
        let mut on_at = None;
        for (t, e) in self.timed_events() {
            match e {
                Event::On => on_at = Some(t),
                Event::Off => {
                    if let Some(start) = on_at.take() {
                        holds.push(t - start);
                    }
                }
                Event::Wait(_) => {}
            }
        }
        holds
    }

    /// Key-up durations between consecutive key-downs.
    pub fn spaces(&self) -> Vec<i64> {
        let mut spaces = Vec::new();
        let mut off_at = None;
        for (t, e) in self.timed_events() {
            match e {
                Event::Off => off_at = Some(t),
                Event::On => {
                    if let Some(end) = off_at.take() {
                        spaces.push(t - end);
                    }
                }
                Event::Wait(_) => {}
            }
        }
        spaces
    }

    /// Keying as seen on the LED: `.`/`-` per hold, `' '` for a 2-unit
    /// space (letter), `" / "` for 3 units or more (word).
    pub fn keying(&self) -> String {
        let unit = DOT_TIME_US as i64;
        let holds = self.holds();
        let spaces = self.spaces();
        let mut out = String::new();

        for (i, hold) in holds.iter().enumerate() {
            out.push(match hold / unit {
                1 => '.',
                3 => '-',
                _ => '?',
            });
            if let Some(space) = spaces.get(i) {
                match space / unit {
                    1 => {}
                    2 => out.push(' '),
                    _ => out.push_str(" / "),
                }
            }
        }
        out
    }
}

/// LED double recording on/off on the timeline.
pub struct RecordingLed {
    timeline: Timeline,
    pub lit: bool,
}

impl Transducer for RecordingLed {
    fn activate(&mut self) {
        self.lit = true;
        self.timeline.record(Event::On);
    }

    fn deactivate(&mut self) {
        self.lit = false;
        self.timeline.record(Event::Off);
    }
}

/// Clock that advances only when the player waits.
pub struct VirtualClock {
    timeline: Timeline,
}

impl Clock for VirtualClock {
    fn now_us(&self) -> i64 {
        self.timeline.now()
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.record(Event::Wait(us));
    }
}

/// Drain the whole transcript into a string.
pub fn transcript_string<const N: usize>(buf: &TranscriptBuffer<N>) -> String {
    String::from_utf8(buf.drain(usize::MAX).collect()).unwrap()
}

/// Clock that trips a cancel token once `waits_left` waits have passed.
pub struct TripClock<'t> {
    pub inner: VirtualClock,
    pub token: &'t CancelToken,
    pub waits_left: usize,
}

impl<'t> TripClock<'t> {
    pub fn new(inner: VirtualClock, token: &'t CancelToken, waits_left: usize) -> Self {
        Self {
            inner,
            token,
            waits_left,
        }
    }
}

impl Clock for TripClock<'_> {
    fn now_us(&self) -> i64 {
        self.inner.now_us()
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
        if self.waits_left == 0 {
            self.token.cancel();
        } else {
            self.waits_left -= 1;
        }
    }
}

/// Clock that empties the transcript on every wait, like a reader task
/// running beside a blocking write.
pub struct DrainingClock<'t, const N: usize> {
    pub inner: VirtualClock,
    pub transcript: &'t TranscriptBuffer<N>,
    pub received: Rc<RefCell<Vec<u8>>>,
}

impl<const N: usize> Clock for DrainingClock<'_, N> {
    fn now_us(&self) -> i64 {
        self.inner.now_us()
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
        let mut buf = [0u8; 16];
        loop {
            let n = self.transcript.drain_into(&mut buf);
            if n == 0 {
                break;
            }
            self.received.borrow_mut().extend_from_slice(&buf[..n]);
        }
    }
}
