//! View slicing, binary and unary, including negative indices.
//!
//! Run with: `cargo run --example slicing`

use strand::{Rope, RopeView, TextView};

fn main() -> strand::Result<()> {
    // Borrowed views slice without copying; negative indices count
    // from the end.
    let tv = TextView::new("some text");

    let tv2 = tv.slice(0, 4);
    assert_eq!(tv2, "some");

    let tv3 = tv.slice(-3, -1);
    assert_eq!(tv3, "ex");

    // Unary cuts: a prefix for positive lengths, a suffix for
    // negative ones.
    assert_eq!(tv.cut(4), "some");
    assert_eq!(tv.cut(-4), "text");

    // Rope views validate UTF-8 at their boundaries. Cyrillic letters
    // are two bytes each, so offset 1 bisects the first one.
    let rope = Rope::from("всем привет!\n");
    let whole = RopeView::from(&rope);
    assert!(whole.slice(0, 1).is_err());

    // Code point boundaries slice fine.
    let greeting = whole.slice(0, 8)?;
    println!("{greeting}");

    Ok(())
}
