const SUFFIXES: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Renders a byte count with decimal (SI) units, e.g. `12.3 MB`.
pub fn format_size(bytes: u64) -> String {
    const BASE: f64 = 1000.0;

    if bytes == 1 {
        return "1 Byte".to_string();
    }
    if bytes < 1000 {
        return format!("{bytes} Bytes");
    }

    let value = bytes as f64;
    let mut unit = BASE;
    for suffix in SUFFIXES {
        unit *= BASE;
        if value < unit {
            return format!("{:.1} {suffix}", value * BASE / unit);
        }
    }

    format!("{:.1} {}", value * BASE / unit, SUFFIXES[SUFFIXES.len() - 1])
}
