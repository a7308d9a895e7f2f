/// Reduce a number to a compact display string by repeatedly dividing by
/// 1000 and appending a `K` per division: 1234 -> "1.2K", 2500000 ->
/// "2.5KK". One decimal place is kept only for non-integer results.
/// The -1 "unknown" sentinel passes through as "-1".
pub fn compact_number(value: f64) -> String {
    let mut num = value;
    let mut suffix = String::new();

    while num >= 1000.0 {
        num /= 1000.0;
        suffix.push('K');
    }

    if num.fract() == 0.0 {
        format!("{}{}", num as i64, suffix)
    } else {
        format!("{:.1}{}", num, suffix)
    }
}
