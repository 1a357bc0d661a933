//! Version gate for peers discovered on the local network.
//!
//! Only peers running 0.15 or newer understand the sync flows that rely on
//! local discovery, so older (or unparseable) versions are filtered out.

/// Oldest compatible release as `(major, minor)`.
pub const MINIMUM_VERSION: (i64, i64) = (0, 15);

/// Check whether a dotted version string meets [`MINIMUM_VERSION`].
///
/// Only the first two components are considered; patch numbers and
/// pre-release tags are ignored. Malformed input is never an error, it is
/// simply treated as incompatible.
///
/// # Examples
/// ```
/// use peer_select_core::meets_minimum_version;
///
/// assert!(meets_minimum_version("0.15.0"));
/// assert!(meets_minimum_version("1.0.0"));
/// assert!(!meets_minimum_version("0.14.9"));
/// assert!(!meets_minimum_version("abc"));
/// ```
pub fn meets_minimum_version(version: &str) -> bool {
    let mut parts = version.split('.');
    let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
        return false;
    };

    let (Some(major), Some(minor)) = (leading_integer(major), leading_integer(minor)) else {
        return false;
    };

    let (min_major, min_minor) = MINIMUM_VERSION;
    major > min_major || (major == min_major && minor >= min_minor)
}

/// Parse the integer prefix of a version component ("15b1" -> 15).
///
/// Returns None when the component has no leading digits. Values too large
/// for `i64` saturate to `i64::MAX`.
fn leading_integer(component: &str) -> Option<i64> {
    let trimmed = component.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    // An all-digit prefix only fails to parse on overflow; saturate
    let n = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * n)
}
