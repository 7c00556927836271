//! Feeds the same document through every possible split point and
//! checks that the resulting event sequence is identical to feeding it
//! whole, regardless of where the feed boundary falls.

use luxem::{Event, RawReader};
use rstest::rstest;

fn read_whole(text: &str) -> Vec<Event> {
    let mut reader = RawReader::new();
    reader.feed(text);
    reader.finish().map(Result::unwrap).collect()
}

fn read_chunked(text: &str, split: usize) -> Vec<Event> {
    let mut reader = RawReader::new();
    reader.feed(&text[..split]);
    reader.feed(&text[split..]);
    reader.finish().map(Result::unwrap).collect()
}

#[rstest]
#[case("{a:1,b:[2,3],c:(t) \"with spaces\"}")]
#[case("[1,2,3,4,5]")]
#[case("(int) 7")]
#[case("{key1: val1,key1.5:val1.5,\"key2 with spaces\": \"val2 with spaces\"}")]
fn splitting_at_every_char_boundary_reproduces_the_whole_read(#[case] text: &str) {
    let expected = read_whole(text);
    for split in text.char_indices().map(|(i, _)| i).chain(core::iter::once(text.len())) {
        let got = read_chunked(text, split);
        assert_eq!(
            got, expected,
            "split at byte {split} in {text:?} produced a different event sequence"
        );
    }
}
