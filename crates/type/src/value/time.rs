// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Result, error::diagnostic::value::invalid_duration, return_error};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;

/// Nanoseconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time(pub i64);

impl Time {
	pub const MIN: Time = Time(i64::MIN);
	pub const MAX: Time = Time(i64::MAX);

	pub fn from_nanos(nanos: i64) -> Self {
		Time(nanos)
	}

	pub fn from_secs(secs: i64) -> Self {
		Time(secs.saturating_mul(NANOS_PER_SECOND))
	}

	pub fn nanos(&self) -> i64 {
		self.0
	}

	pub fn now() -> Self {
		let nanos = std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_nanos().min(i64::MAX as u128) as i64)
			.unwrap_or(0);
		Time(nanos)
	}

	/// Adds a duration, applying the month part with calendar arithmetic.
	/// Days past the end of the target month clamp to its last day.
	pub fn add(&self, duration: Duration) -> Time {
		let mut nanos = self.0;
		if duration.months != 0 {
			let days = nanos.div_euclid(NANOS_PER_DAY);
			let within_day = nanos.rem_euclid(NANOS_PER_DAY);
			let (year, month, day) = civil_from_days(days);
			let total = year * 12 + (month as i64 - 1) + duration.months;
			let new_year = total.div_euclid(12);
			let new_month = (total.rem_euclid(12) + 1) as u32;
			let new_day = day.min(days_in_month(new_year, new_month));
			nanos = days_from_civil(new_year, new_month, new_day)
				.saturating_mul(NANOS_PER_DAY)
				.saturating_add(within_day);
		}
		Time(nanos.saturating_add(duration.nanos))
	}

	pub fn sub(&self, duration: Duration) -> Time {
		self.add(duration.negate())
	}

	/// Truncates down to a multiple of a fixed duration.
	pub fn truncate(&self, every: Duration) -> Time {
		if every.months != 0 || every.nanos <= 0 {
			return *self;
		}
		Time(self.0 - self.0.rem_euclid(every.nanos))
	}

	/// Parses `YYYY-MM-DDTHH:MM:SS[.fraction]Z`.
	pub fn parse_rfc3339(text: &str) -> Option<Time> {
		let text = text.strip_suffix('Z')?;
		let (date, clock) = text.split_once('T')?;
		let mut date_parts = date.splitn(3, '-');
		let year: i64 = date_parts.next()?.parse().ok()?;
		let month: u32 = date_parts.next()?.parse().ok()?;
		let day: u32 = date_parts.next()?.parse().ok()?;
		if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
			return None;
		}
		let (hms, fraction) = match clock.split_once('.') {
			Some((hms, fraction)) => (hms, Some(fraction)),
			None => (clock, None),
		};
		let mut clock_parts = hms.splitn(3, ':');
		let hour: i64 = clock_parts.next()?.parse().ok()?;
		let minute: i64 = clock_parts.next()?.parse().ok()?;
		let second: i64 = clock_parts.next()?.parse().ok()?;
		if hour > 23 || minute > 59 || second > 60 {
			return None;
		}
		let mut nanos = 0i64;
		if let Some(fraction) = fraction {
			if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
				return None;
			}
			nanos = fraction.parse::<i64>().ok()? * 10i64.pow(9 - fraction.len() as u32);
		}
		let days = days_from_civil(year, month, day);
		let secs = days * 86_400 + hour * 3_600 + minute * 60 + second;
		Some(Time(secs.checked_mul(NANOS_PER_SECOND)?.checked_add(nanos)?))
	}
}

impl Display for Time {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let days = self.0.div_euclid(NANOS_PER_DAY);
		let within_day = self.0.rem_euclid(NANOS_PER_DAY);
		let (year, month, day) = civil_from_days(days);
		let secs = within_day / NANOS_PER_SECOND;
		let nanos = within_day % NANOS_PER_SECOND;
		write!(f, "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}", year, month, day, secs / 3600, secs / 60 % 60, secs % 60)?;
		if nanos != 0 {
			let fraction = format!("{:09}", nanos);
			write!(f, ".{}", fraction.trim_end_matches('0'))?;
		}
		f.write_str("Z")
	}
}

/// Calendar duration: a month part and a fixed nanosecond part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Duration {
	pub months: i64,
	pub nanos: i64,
}

const UNITS: [(&str, i64); 8] = [
	("w", 7 * NANOS_PER_DAY),
	("d", NANOS_PER_DAY),
	("h", 3_600 * NANOS_PER_SECOND),
	("m", 60 * NANOS_PER_SECOND),
	("s", NANOS_PER_SECOND),
	("ms", 1_000_000),
	("us", 1_000),
	("ns", 1),
];

impl Duration {
	pub const ZERO: Duration = Duration {
		months: 0,
		nanos: 0,
	};

	pub fn from_nanos(nanos: i64) -> Self {
		Self {
			months: 0,
			nanos,
		}
	}

	pub fn from_secs(secs: i64) -> Self {
		Self::from_nanos(secs.saturating_mul(NANOS_PER_SECOND))
	}

	pub fn from_months(months: i64) -> Self {
		Self {
			months,
			nanos: 0,
		}
	}

	pub fn is_zero(&self) -> bool {
		self.months == 0 && self.nanos == 0
	}

	pub fn is_negative(&self) -> bool {
		self.months < 0 || self.nanos < 0
	}

	pub fn negate(&self) -> Self {
		Self {
			months: -self.months,
			nanos: -self.nanos,
		}
	}

	pub fn add(&self, other: Duration) -> Self {
		Self {
			months: self.months.saturating_add(other.months),
			nanos: self.nanos.saturating_add(other.nanos),
		}
	}

	/// Parses a duration literal such as `1h30m`, `-5m` or `1mo2d`.
	pub fn parse(text: &str) -> Result<Duration> {
		let (negative, mut rest) = match text.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, text),
		};
		if rest.is_empty() {
			return_error!(invalid_duration(text));
		}
		let mut result = Duration::ZERO;
		while !rest.is_empty() {
			let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
			if digits == 0 {
				return_error!(invalid_duration(text));
			}
			let Ok(magnitude) = rest[..digits].parse::<i64>() else {
				return_error!(invalid_duration(text));
			};
			rest = &rest[digits..];
			let unit_len = rest.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
			let unit = &rest[..unit_len];
			rest = &rest[unit_len..];
			match unit {
				"y" => result.months = result.months.saturating_add(magnitude.saturating_mul(12)),
				"mo" => result.months = result.months.saturating_add(magnitude),
				_ => {
					let Some((_, scale)) = UNITS.iter().find(|(name, _)| *name == unit) else {
						return_error!(invalid_duration(text));
					};
					result.nanos = result.nanos.saturating_add(magnitude.saturating_mul(*scale));
				}
			}
		}
		Ok(if negative {
			result.negate()
		} else {
			result
		})
	}
}

impl Display for Duration {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if self.is_zero() {
			return f.write_str("0ns");
		}
		if self.is_negative() {
			f.write_str("-")?;
		}
		let mut months = self.months.unsigned_abs();
		let years = months / 12;
		months %= 12;
		if years > 0 {
			write!(f, "{}y", years)?;
		}
		if months > 0 {
			write!(f, "{}mo", months)?;
		}
		let mut nanos = self.nanos.unsigned_abs();
		for (unit, scale) in UNITS {
			let scale = scale as u64;
			if nanos >= scale {
				write!(f, "{}{}", nanos / scale, unit)?;
				nanos %= scale;
			}
		}
		Ok(())
	}
}

fn is_leap(year: i64) -> bool {
	(year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
	match month {
		1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
		4 | 6 | 9 | 11 => 30,
		_ if is_leap(year) => 29,
		_ => 28,
	}
}

// Howard Hinnant's civil calendar conversions.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
	let y = if month <= 2 {
		year - 1
	} else {
		year
	};
	let era = y.div_euclid(400);
	let yoe = y - era * 400;
	let m = month as i64;
	let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
	let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
	era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
	let z = days + 719_468;
	let era = z.div_euclid(146_097);
	let doe = z - era * 146_097;
	let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
	let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
	let mp = (5 * doy + 2) / 153;
	let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
	let month = (if mp < 10 {
		mp + 3
	} else {
		mp - 9
	}) as u32;
	let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
	(year, month, day)
}
