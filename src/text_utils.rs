use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Allowed: tab, line feed, carriage return and U+0020 to U+00FF
    static ref INVALID_XML_CHARS: Regex = Regex::new(r"[^\x09\x0A\x0D\x20-\xFF]").unwrap();

    static ref DATE_TIME_REGEX: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2}))?(?:\.\d+)?)?\s*(?:UTC|Z)?$"
    ).unwrap();
}

/// Removes every character that may not appear in the exported XML document.
pub fn sanitize_xml(text: &str) -> String {
    INVALID_XML_CHARS.replace_all(text, "").to_string()
}

fn to_int<T: std::str::FromStr>(caps: &Captures, idx: usize, date_str: &str) -> Result<T, String> {
    // Missing time components count as zero
    let num_str = caps.get(idx).map_or("0", |m| m.as_str());
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses the dates found in the issues CSV.
///
/// Accepts `2020-01-01`, `2020-01-01 10:42:32[.123][ UTC]` and RFC 3339 timestamps.
/// Offsets are converted to UTC.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let buf = buf.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Ok(dt.naive_utc());
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let y: i32 = to_int(&caps, 1, buf)?;
    let m: u32 = to_int(&caps, 2, buf)?;
    let d: u32 = to_int(&caps, 3, buf)?;
    let h: u32 = to_int(&caps, 4, buf)?;
    let mn: u32 = to_int(&caps, 5, buf)?;
    let s: u32 = to_int(&caps, 6, buf)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> String {
    date_time.format("%Y-%m-%d %H:%M:%S").to_string()
}
