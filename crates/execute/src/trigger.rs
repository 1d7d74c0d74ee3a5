// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Runtime triggers deciding when a cached table is emitted.

use flux_column::GroupKey;
use flux_plan::TriggerSpec;
use flux_type::{Duration, Time};

/// What a trigger sees about one buffered table.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
	pub key: &'a GroupKey,
	pub rows: usize,
	pub watermark: Time,
	pub processing_time: Time,
}

impl TriggerContext<'_> {
	/// The `_stop` of the table's key; tables without one end at [`Time::MAX`].
	fn stop(&self) -> Time {
		self.key
			.index("_stop")
			.and_then(|i| self.key.value_time(i).ok())
			.unwrap_or(Time::MAX)
	}
}

pub trait Trigger: Send {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool;

	/// A finished trigger never fires again; its table is discarded after
	/// the last emission.
	fn finished(&self) -> bool;

	fn reset(&mut self);
}

pub fn new_trigger(spec: &TriggerSpec) -> Box<dyn Trigger> {
	match spec {
		TriggerSpec::AfterWatermark {
			allowed_lateness,
		} => Box::new(AfterWatermark {
			lateness: *allowed_lateness,
			finished: false,
		}),
		TriggerSpec::AfterProcessingTime {
			duration,
		} => Box::new(AfterProcessingTime {
			duration: *duration,
			finished: false,
		}),
		TriggerSpec::AfterAtLeastCount {
			count,
		} => Box::new(AfterAtLeastCount {
			count: *count,
			finished: false,
		}),
		TriggerSpec::Repeated(inner) => Box::new(Repeated {
			inner: new_trigger(inner),
		}),
		TriggerSpec::OrFinally {
			main,
			finally,
		} => Box::new(OrFinally {
			main: new_trigger(main),
			finally: new_trigger(finally),
			finished: false,
		}),
		TriggerSpec::Narrow => Box::new(Narrow),
	}
}

struct AfterWatermark {
	lateness: Duration,
	finished: bool,
}

impl Trigger for AfterWatermark {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool {
		if c.watermark >= c.stop().add(self.lateness) {
			self.finished = true;
		}
		self.finished
	}

	fn finished(&self) -> bool {
		self.finished
	}

	fn reset(&mut self) {
		self.finished = false;
	}
}

struct AfterProcessingTime {
	duration: Duration,
	finished: bool,
}

impl Trigger for AfterProcessingTime {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool {
		if c.processing_time >= c.stop().add(self.duration) {
			self.finished = true;
		}
		self.finished
	}

	fn finished(&self) -> bool {
		self.finished
	}

	fn reset(&mut self) {
		self.finished = false;
	}
}

struct AfterAtLeastCount {
	count: usize,
	finished: bool,
}

impl Trigger for AfterAtLeastCount {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool {
		if c.rows >= self.count {
			self.finished = true;
		}
		self.finished
	}

	fn finished(&self) -> bool {
		self.finished
	}

	fn reset(&mut self) {
		self.finished = false;
	}
}

struct Repeated {
	inner: Box<dyn Trigger>,
}

impl Trigger for Repeated {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool {
		let fired = self.inner.triggered(c);
		if fired {
			self.inner.reset();
		}
		fired
	}

	fn finished(&self) -> bool {
		false
	}

	fn reset(&mut self) {
		self.inner.reset();
	}
}

struct OrFinally {
	main: Box<dyn Trigger>,
	finally: Box<dyn Trigger>,
	finished: bool,
}

impl Trigger for OrFinally {
	fn triggered(&mut self, c: &TriggerContext<'_>) -> bool {
		if self.finally.triggered(c) {
			self.finished = true;
			return true;
		}
		self.main.triggered(c)
	}

	fn finished(&self) -> bool {
		self.finished
	}

	fn reset(&mut self) {
		self.main.reset();
		self.finally.reset();
		self.finished = false;
	}
}

struct Narrow;

impl Trigger for Narrow {
	fn triggered(&mut self, _c: &TriggerContext<'_>) -> bool {
		true
	}

	fn finished(&self) -> bool {
		true
	}

	fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
	use flux_column::{GroupKey, range_key};

	use super::*;

	fn context(key: &GroupKey, rows: usize, watermark: i64) -> TriggerContext<'_> {
		TriggerContext {
			key,
			rows,
			watermark: Time(watermark),
			processing_time: Time(0),
		}
	}

	#[test]
	fn test_after_watermark_uses_stop() {
		let key = range_key(&GroupKey::empty(), Time(0), Time(100)).unwrap();
		let mut trigger = new_trigger(&TriggerSpec::default());
		assert!(!trigger.triggered(&context(&key, 1, 99)));
		assert!(trigger.triggered(&context(&key, 1, 100)));
		assert!(trigger.finished());

		let unbounded = GroupKey::empty();
		let mut trigger = new_trigger(&TriggerSpec::default());
		assert!(!trigger.triggered(&context(&unbounded, 1, 1_000)));
		assert!(trigger.triggered(&context(&unbounded, 1, i64::MAX)));
	}

	#[test]
	fn test_repeated_count_never_finishes() {
		let key = GroupKey::empty();
		let mut trigger = new_trigger(&TriggerSpec::Repeated(Box::new(TriggerSpec::AfterAtLeastCount {
			count: 2,
		})));
		assert!(!trigger.triggered(&context(&key, 1, 0)));
		assert!(trigger.triggered(&context(&key, 2, 0)));
		assert!(!trigger.finished());
		assert!(trigger.triggered(&context(&key, 3, 0)));
	}

	#[test]
	fn test_or_finally() {
		let key = range_key(&GroupKey::empty(), Time(0), Time(10)).unwrap();
		let mut trigger = new_trigger(&TriggerSpec::OrFinally {
			main: Box::new(TriggerSpec::Repeated(Box::new(TriggerSpec::AfterAtLeastCount {
				count: 5,
			}))),
			finally: Box::new(TriggerSpec::default()),
		});
		assert!(trigger.triggered(&context(&key, 5, 0)));
		assert!(!trigger.finished());
		assert!(trigger.triggered(&context(&key, 0, 10)));
		assert!(trigger.finished());
	}
}
