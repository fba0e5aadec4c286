//! # Clipboard Grid Codec
//!
//! Tab-separated text is the lingua franca between the sheet and
//! spreadsheets: rows separated by newlines, cells by tabs. Decoding
//! tolerates Windows line endings and drops whitespace-only lines,
//! including the trailing newline spreadsheet apps append to copies.

/// Encode a block of cells as TSV (no trailing newline).
pub fn encode(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode TSV text into a block of cells.
///
/// Lines split on `\n` with a trailing `\r` stripped; whitespace-only
/// lines are not rows and are dropped, so blank separator lines in a
/// copied block never shift the rows below them. Fully blank input
/// decodes to an empty block.
pub fn decode(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(|cell| cell.to_string()).collect())
        .collect()
}

/// Flatten a single-column block into one row.
///
/// Size lists are often copied vertically from a spreadsheet column; pasted
/// into the size header row they should land horizontally. Returns `None`
/// when the block is not a column of two or more single cells.
pub fn flatten_single_column(block: &[Vec<String>]) -> Option<Vec<String>> {
    if block.len() < 2 || !block.iter().all(|row| row.len() == 1) {
        return None;
    }
    Some(block.iter().map(|row| row[0].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_encode_joins_tabs_and_newlines() {
        let rows = block(&[&["BODY", "2", "10.5"], &["SLEEVE", "2", "4.25"]]);
        assert_eq!(encode(&rows), "BODY\t2\t10.5\nSLEEVE\t2\t4.25");
    }

    #[test]
    fn test_decode_roundtrip() {
        let rows = block(&[&["S", "M", "L"], &["1", "2", "3"]]);
        assert_eq!(decode(&encode(&rows)), rows);
    }

    #[test]
    fn test_decode_tolerates_crlf_and_trailing_newline() {
        let decoded = decode("S\tM\r\nL\tXL\r\n\n");
        assert_eq!(decoded, block(&[&["S", "M"], &["L", "XL"]]));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
        assert!(decode("\n").is_empty());
        assert!(decode("  \t \n").is_empty());
    }

    #[test]
    fn test_decode_drops_blank_lines() {
        let decoded = decode("FRONT\t2\n\nBACK\t1\n  \t \nHOOD\t1");
        assert_eq!(
            decoded,
            block(&[&["FRONT", "2"], &["BACK", "1"], &["HOOD", "1"]])
        );
    }

    #[test]
    fn test_decode_keeps_empty_cells() {
        let decoded = decode("A\t\tB");
        assert_eq!(decoded, block(&[&["A", "", "B"]]));
    }

    #[test]
    fn test_flatten_single_column() {
        let column = block(&[&["S"], &["M"], &["L"]]);
        assert_eq!(
            flatten_single_column(&column),
            Some(vec!["S".to_string(), "M".to_string(), "L".to_string()])
        );
    }

    #[test]
    fn test_flatten_rejects_wide_or_single_blocks() {
        assert_eq!(flatten_single_column(&block(&[&["S", "M"]])), None);
        assert_eq!(flatten_single_column(&block(&[&["S"]])), None);
        assert_eq!(flatten_single_column(&block(&[&["S"], &["M", "L"]])), None);
    }
}
