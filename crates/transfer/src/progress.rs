/// Computes `round(uploaded / total * 100)`.
///
/// 100 is reserved for a fully uploaded file: a partial upload that would
/// round up to 100 reports 99. An empty file is complete by definition.
pub fn percent_complete(uploaded: u64, total: u64) -> u8 {
    if total == 0 || uploaded >= total {
        return 100;
    }
    let pct = (uploaded as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 99.0) as u8
}
