use crate::error::{Result, SheetError};

/// Convert column letters to 0-based column index
/// A=0, B=1, ... Z=25, AA=26, AB=27, ... (case-insensitive, `$` anchors ignored)
pub fn parse_column_letters(col_str: &str) -> Result<usize> {
    let letters = col_str.trim().trim_start_matches('$').to_uppercase();
    if letters.is_empty() {
        return Err(SheetError::InvalidColumnLetters(col_str.to_string()));
    }

    let mut col: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(SheetError::InvalidColumnLetters(col_str.to_string()));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(usize::from(b - b'A') + 1))
            .ok_or_else(|| SheetError::InvalidColumnLetters(col_str.to_string()))?;
    }

    Ok(col - 1)
}

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
#[must_use]
pub fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1; // Convert to 1-based for calculation

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}

/// Absolute whole-column range such as `$A:$D`, columns ordered left to right
#[must_use]
pub fn absolute_column_range(first: usize, last: usize) -> String {
    let (lo, hi) = (first.min(last), first.max(last));
    format!(
        "${}:${}",
        column_index_to_letters(lo),
        column_index_to_letters(hi)
    )
}
