/// Splits concatenated FASTA text into single records.
///
/// The text is split on `>`, the empty fragment before the first delimiter is
/// discarded, and `>` is re-prepended to each retained fragment. No further
/// validation of record contents happens here.
pub fn split_records(raw: &str) -> Vec<String> {
    raw.split('>')
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| format!(">{fragment}"))
        .collect()
}
