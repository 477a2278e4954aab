use super::*;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 8);
    let b = Span::new(2, 5);
    assert_eq!(a.merge(b), Span::new(2, 8));
}

#[test]
fn from_range_saturates() {
    let span = Span::from_range(3..usize::MAX);
    assert_eq!(span.start, 3);
    assert_eq!(span.end, u32::MAX);
}

#[test]
fn line_index_maps_offsets() {
    let index = LineIndex::new("ab\ncd\n\nef");
    assert_eq!(index.line(0), 1);
    assert_eq!(index.line(2), 1);
    assert_eq!(index.line(3), 2);
    assert_eq!(index.line(6), 3);
    assert_eq!(index.line(7), 4);
    assert_eq!(index.line_col(4), (2, 2));
}

#[test]
fn line_start_out_of_range() {
    let index = LineIndex::new("x\ny");
    assert_eq!(index.line_start(2), Some(2));
    assert_eq!(index.line_start(0), None);
    assert_eq!(index.line_start(3), None);
    assert_eq!(index.line_count(), 2);
}
