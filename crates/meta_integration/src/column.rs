/// Zero-based column index to its A1 letters: `0 -> A`, `25 -> Z`, `26 -> AA`.
pub fn column_index_to_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|b| *b as char).collect()
}
