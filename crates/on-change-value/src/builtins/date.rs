//! Date methods. Dates hold a UTC time value in milliseconds; the `UTC`
//! variants of every accessor are aliases of the plain ones.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};

use super::{arg, slot_receiver, MethodTable};
use crate::error::{ValueError, ValueResult};
use crate::object::{Kind, Slots};
use crate::value::Value;

const MS_PER_DAY: f64 = 86_400_000.0;
const MAX_TIME: f64 = 8.64e15;

pub(crate) const METHODS: MethodTable = &[
    ("getTime", get_time),
    ("valueOf", get_time),
    ("getFullYear", get_full_year),
    ("getUTCFullYear", get_full_year),
    ("getMonth", get_month),
    ("getUTCMonth", get_month),
    ("getDate", get_date),
    ("getUTCDate", get_date),
    ("getDay", get_day),
    ("getUTCDay", get_day),
    ("getHours", get_hours),
    ("getUTCHours", get_hours),
    ("getMinutes", get_minutes),
    ("getUTCMinutes", get_minutes),
    ("getSeconds", get_seconds),
    ("getUTCSeconds", get_seconds),
    ("getMilliseconds", get_milliseconds),
    ("getUTCMilliseconds", get_milliseconds),
    ("getTimezoneOffset", get_timezone_offset),
    ("toISOString", to_iso_string),
    ("toJSON", to_json),
    ("setTime", set_time),
    ("setFullYear", set_full_year),
    ("setUTCFullYear", set_full_year),
    ("setMonth", set_month),
    ("setUTCMonth", set_month),
    ("setDate", set_date),
    ("setUTCDate", set_date),
    ("setHours", set_hours),
    ("setUTCHours", set_hours),
    ("setMinutes", set_minutes),
    ("setUTCMinutes", set_minutes),
    ("setSeconds", set_seconds),
    ("setUTCSeconds", set_seconds),
    ("setMilliseconds", set_milliseconds),
    ("setUTCMilliseconds", set_milliseconds),
];

/// Clamp a time value to the representable range; out-of-range and
/// non-finite values become `NaN`.
pub(crate) fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return f64::NAN;
    }
    t.trunc() + 0.0
}

/// ISO-8601 rendering of a time value, `None` for an invalid date.
pub fn iso_string(t: f64) -> Option<String> {
    if t.is_nan() {
        return None;
    }
    let dt = DateTime::from_timestamp_millis(t as i64)?;
    Some(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

struct Fields {
    year: f64,
    month: f64,
    date: f64,
    weekday: f64,
    hours: f64,
    minutes: f64,
    seconds: f64,
    millis: f64,
}

fn fields(t: f64) -> Option<Fields> {
    if t.is_nan() {
        return None;
    }
    let dt = DateTime::from_timestamp_millis(t as i64)?;
    Some(Fields {
        year: f64::from(dt.year()),
        month: f64::from(dt.month0()),
        date: f64::from(dt.day()),
        weekday: f64::from(dt.weekday().num_days_from_sunday()),
        hours: f64::from(dt.hour()),
        minutes: f64::from(dt.minute()),
        seconds: f64::from(dt.second()),
        millis: f64::from(dt.timestamp_subsec_millis()),
    })
}

fn day(t: f64) -> f64 {
    (t / MS_PER_DAY).floor()
}

fn time_within_day(t: f64) -> f64 {
    t.rem_euclid(MS_PER_DAY)
}

fn make_time(hours: f64, minutes: f64, seconds: f64, millis: f64) -> f64 {
    if ![hours, minutes, seconds, millis].iter().all(|n| n.is_finite()) {
        return f64::NAN;
    }
    hours.trunc() * 3_600_000.0 + minutes.trunc() * 60_000.0 + seconds.trunc() * 1_000.0 + millis.trunc()
}

/// Days since the epoch for a year, zero-based month (may overflow into
/// later years) and day of month.
fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if ![year, month, date].iter().all(|n| n.is_finite()) {
        return f64::NAN;
    }
    let (year, month, date) = (year.trunc(), month.trunc(), date.trunc());
    let ym = year + (month / 12.0).floor();
    if ym.abs() > 400_000.0 {
        return f64::NAN;
    }
    let mn = month.rem_euclid(12.0);
    let first = NaiveDate::from_ymd_opt(ym as i32, mn as u32 + 1, 1);
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1);
    match (first, epoch) {
        (Some(first), Some(epoch)) => (first - epoch).num_days() as f64 + date - 1.0,
        _ => f64::NAN,
    }
}

fn make_date(day: f64, time: f64) -> f64 {
    if !day.is_finite() || !time.is_finite() {
        return f64::NAN;
    }
    day * MS_PER_DAY + time
}

fn time_of(this: &Value, method: &'static str) -> ValueResult<f64> {
    let date = slot_receiver(this, Kind::Date, method)?;
    Ok(date.date_value().unwrap_or(f64::NAN))
}

fn read(this: &Value, method: &'static str, field: fn(&Fields) -> f64) -> ValueResult<Value> {
    let t = time_of(this, method)?;
    Ok(Value::from(fields(t).map_or(f64::NAN, |f| field(&f))))
}

fn write(this: &Value, method: &'static str, compute: impl FnOnce(f64) -> f64) -> ValueResult<Value> {
    let date = slot_receiver(this, Kind::Date, method)?;
    let t = date.date_value().unwrap_or(f64::NAN);
    let updated = time_clip(compute(t));
    date.with_slots(|slots| {
        if let Slots::Date(slot) = slots {
            *slot = updated;
        }
    });
    Ok(Value::from(updated))
}

fn num(args: &[Value], index: usize) -> f64 {
    arg(args, index).to_number()
}

fn opt(args: &[Value], index: usize) -> Option<f64> {
    args.get(index).map(Value::to_number)
}

fn get_time(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    Ok(Value::from(time_of(this, "getTime")?))
}

fn get_full_year(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getFullYear", |f| f.year)
}

fn get_month(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getMonth", |f| f.month)
}

fn get_date(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getDate", |f| f.date)
}

fn get_day(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getDay", |f| f.weekday)
}

fn get_hours(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getHours", |f| f.hours)
}

fn get_minutes(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getMinutes", |f| f.minutes)
}

fn get_seconds(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getSeconds", |f| f.seconds)
}

fn get_milliseconds(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getMilliseconds", |f| f.millis)
}

fn get_timezone_offset(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    read(this, "getTimezoneOffset", |_| 0.0)
}

fn to_iso_string(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let t = time_of(this, "toISOString")?;
    iso_string(t)
        .map(Value::from)
        .ok_or(ValueError::InvalidDate)
}

fn to_json(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let t = time_of(this, "toJSON")?;
    Ok(iso_string(t).map_or(Value::Null, Value::from))
}

fn set_time(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let t = num(args, 0);
    write(this, "setTime", |_| t)
}

fn set_full_year(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let (year, month, date) = (num(args, 0), opt(args, 1), opt(args, 2));
    write(this, "setFullYear", |t| {
        let t = if t.is_nan() { 0.0 } else { t };
        let Some(f) = fields(t) else { return f64::NAN };
        make_date(
            make_day(year, month.unwrap_or(f.month), date.unwrap_or(f.date)),
            time_within_day(t),
        )
    })
}

fn set_month(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let (month, date) = (num(args, 0), opt(args, 1));
    write(this, "setMonth", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        make_date(
            make_day(f.year, month, date.unwrap_or(f.date)),
            time_within_day(t),
        )
    })
}

fn set_date(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let date = num(args, 0);
    write(this, "setDate", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        make_date(make_day(f.year, f.month, date), time_within_day(t))
    })
}

fn set_hours(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let (hours, minutes, seconds, millis) = (num(args, 0), opt(args, 1), opt(args, 2), opt(args, 3));
    write(this, "setHours", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        let time = make_time(
            hours,
            minutes.unwrap_or(f.minutes),
            seconds.unwrap_or(f.seconds),
            millis.unwrap_or(f.millis),
        );
        make_date(day(t), time)
    })
}

fn set_minutes(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let (minutes, seconds, millis) = (num(args, 0), opt(args, 1), opt(args, 2));
    write(this, "setMinutes", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        let time = make_time(
            f.hours,
            minutes,
            seconds.unwrap_or(f.seconds),
            millis.unwrap_or(f.millis),
        );
        make_date(day(t), time)
    })
}

fn set_seconds(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let (seconds, millis) = (num(args, 0), opt(args, 1));
    write(this, "setSeconds", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        let time = make_time(f.hours, f.minutes, seconds, millis.unwrap_or(f.millis));
        make_date(day(t), time)
    })
}

fn set_milliseconds(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let millis = num(args, 0);
    write(this, "setMilliseconds", |t| {
        let Some(f) = fields(t) else { return f64::NAN };
        make_date(day(t), make_time(f.hours, f.minutes, f.seconds, millis))
    })
}
