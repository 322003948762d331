use fl_core::StringSource;
use fl_scan::{
    BufferedScanner, DelimitedOptions, PhrasePair, RepeatedPhrase, ScanMode, coerce_delimited,
};
use proptest::prelude::*;

fn body_line() -> impl Strategy<Value = String> {
    prop::collection::vec(0_u32..1000, 1..6)
        .prop_map(|v| v.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" "))
}

/// Data lines with the start phrase reprinted now and then, the way Fluent
/// repeats its residual header.
fn span_line() -> impl Strategy<Value = String> {
    prop_oneof![4 => body_line(), 1 => Just("BEGIN".to_string())]
}

fn transcript() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<String>)> {
    (
        prop::collection::vec(body_line(), 0..5),
        prop::collection::vec(span_line(), 0..20),
        prop::collection::vec(body_line(), 0..5),
    )
}

const LINE_WIDTH: usize = 24;

/// Like [`render`], with every line padded to `LINE_WIDTH` bytes so chunk
/// sizes that are multiples of it never split a phrase.
fn render_aligned(pre: &[String], body: &[String], post: &[String]) -> String {
    render(pre, body, post)
        .lines()
        .map(|l| format!("{:<width$}\n", l, width = LINE_WIDTH - 1))
        .collect()
}

fn render(pre: &[String], body: &[String], post: &[String]) -> String {
    let mut text = String::new();
    for l in pre {
        text.push_str(l);
        text.push('\n');
    }
    text.push_str("BEGIN\n");
    for l in body {
        text.push_str(l);
        text.push('\n');
    }
    text.push_str("FINISH\n");
    for l in post {
        text.push_str(l);
        text.push('\n');
    }
    text
}

proptest! {
    #[test]
    fn chunk_size_does_not_change_the_span(
        (pre, body, post) in transcript(),
        lines_per_chunk in 1_usize..8,
        include_pairs in any::<bool>()
    ) {
        let text = render_aligned(&pre, &body, &post);
        let pair = PhrasePair::new("BEGIN", "FINISH", include_pairs).unwrap();
        let buffered = BufferedScanner::new(lines_per_chunk * LINE_WIDTH, ScanMode::Buffered)
            .unwrap()
            .scan(&mut StringSource::from_text(text.clone()), &pair)
            .unwrap();
        let whole = BufferedScanner::whole_file()
            .scan(&mut StringSource::from_text(text), &pair)
            .unwrap();
        prop_assert_eq!(&buffered, &whole);

        // every reprinted start line survives
        let starts = body.iter().filter(|l| l.as_str() == "BEGIN").count();
        let expected = starts + usize::from(include_pairs);
        prop_assert_eq!(buffered.matches("BEGIN").count(), expected);
    }

    #[test]
    fn large_chunks_match_whole_file((pre, body, post) in transcript()) {
        let text = render(&pre, &body, &post);
        let pair = PhrasePair::new("BEGIN", "FINISH", false).unwrap();
        let buffered = BufferedScanner::new(text.len() + 1, ScanMode::Buffered)
            .unwrap()
            .scan(&mut StringSource::from_text(text.clone()), &pair)
            .unwrap();
        let whole = BufferedScanner::whole_file()
            .scan(&mut StringSource::from_text(text), &pair)
            .unwrap();
        prop_assert_eq!(&buffered, &whole);
        prop_assert_eq!(buffered, body.join("\n").trim().to_string());
    }

    #[test]
    fn forced_coercion_is_rectangular(lines in prop::collection::vec(body_line(), 1..30)) {
        let text = lines.join("\n");
        let out = coerce_delimited(&text, &DelimitedOptions::default()).unwrap();
        let widest = lines.iter().map(|l| l.split_whitespace().count()).max().unwrap_or(0);
        prop_assert_eq!(out.width, widest);
        prop_assert!(!out.ragged);
        for (row, line) in out.rows.iter().zip(&lines) {
            prop_assert_eq!(row.len(), widest);
            let given = line.split_whitespace().count();
            prop_assert!(row[..given].iter().all(Option::is_some));
            prop_assert!(row[given..].iter().all(Option::is_none));
        }
    }
}

#[test]
fn repeated_phrase_block_from_whole_file() {
    let text = "a\nP x=1\nP y=2\nb\nP z=3\n";
    let search = RepeatedPhrase::new("P ").unwrap();
    let out = BufferedScanner::whole_file()
        .scan(&mut StringSource::from_text(text), &search)
        .unwrap();
    assert_eq!(out, "P x=1\nP y=2");
}
