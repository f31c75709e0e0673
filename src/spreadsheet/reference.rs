/// Converts 0-based row & column indexes to an Excel-style cell reference ("A1", "AB12").
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut reference = col_to_letters(col);
    reference.push_str(&(row + 1).to_string());
    reference
}

/// Converts a 0-based column index to Excel column letters (0 = A, 26 = AA).
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 25), "Z10");
        assert_eq!(index_to_reference(0, 26), "AA1");
        assert_eq!(index_to_reference(1, 51), "AZ2");
        assert_eq!(index_to_reference(2, 52), "BA3");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
    }
}
