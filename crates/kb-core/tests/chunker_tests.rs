use kb_core::chunker::{Chunker, ChunkingConfig};
use kb_core::types::Document;
use kb_core::Error;

fn chunker(chunk_size: usize, overlap: usize, boundary_window: usize) -> Chunker {
    Chunker::new(ChunkingConfig { chunk_size, overlap, boundary_window }).expect("valid config")
}

/// `count` sentences; "five" makes each 48 chars long, "eleven" 50.
fn sentences(word: &str, count: usize) -> String {
    (0..count).map(|i| format!("Rule {i:02}: refunds are processed within {word} days.")).collect()
}

#[test]
fn short_document_is_a_single_trimmed_chunk() {
    let chunks = Chunker::default().split("  We issue refunds within 5 business days.\n");
    assert_eq!(chunks, vec!["We issue refunds within 5 business days.".to_string()]);
}

#[test]
fn document_of_exactly_chunk_size_is_a_single_chunk() {
    let text = "x".repeat(500);
    assert_eq!(Chunker::default().split(&text), vec![text]);
}

#[test]
fn empty_document_has_no_chunks() {
    assert!(Chunker::default().split("").is_empty());
    assert!(Chunker::default().split(" \n\t ").is_empty());
}

#[test]
fn twelve_hundred_chars_make_three_sentence_aligned_chunks() {
    let text = sentences("eleven", 24);
    assert_eq!(text.chars().count(), 1200);

    let chunks = Chunker::default().split(&text);
    assert_eq!(chunks.len(), 3);
    let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
    assert_eq!(lens, vec![500, 500, 400]);
    for chunk in &chunks {
        assert!(chunk.starts_with("Rule "), "chunk starts at a sentence: {chunk:?}");
        assert!(chunk.ends_with('.'));
    }
}

#[test]
fn cut_snaps_back_to_the_previous_sentence_end() {
    let text = sentences("five", 25);
    assert_eq!(text.chars().count(), 1200);

    let chunks = Chunker::default().split(&text);
    let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
    // 500 -> 480 and 880 -> 864 snap to the periods at 479 and 863.
    assert_eq!(lens, vec![480, 484, 436, 36]);
    assert!(chunks[0].ends_with("days."));
    assert!(chunks[1].ends_with("days."));
    // The tail shorter than the overlap is still emitted.
    assert_eq!(chunks[3], "unds are processed within five days.");
}

#[test]
fn hard_cut_when_no_boundary_in_window() {
    let text = "abcdefghij".repeat(120);
    let chunks = Chunker::default().split(&text);
    let lens: Vec<usize> = chunks.iter().map(String::len).collect();
    assert_eq!(lens, vec![500, 500, 400]);
    assert_eq!(&chunks[1][..100], &chunks[0][400..], "consecutive chunks share the overlap");
}

#[test]
fn sizes_are_counted_in_characters() {
    let text = "ü".repeat(1200);
    let chunks = Chunker::default().split(&text);
    let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
    assert_eq!(lens, vec![500, 500, 400]);
}

#[test]
fn chunks_cover_the_whole_document() {
    let text: String = (0..400)
        .map(|i| format!("w{i:04}{}", if i % 7 == 6 { ". " } else { " " }))
        .collect::<String>()
        .trim_end()
        .to_string();

    for (size, overlap, window) in [(500, 100, 100), (200, 50, 30), (120, 0, 40), (100, 80, 100)] {
        let chunks = chunker(size, overlap, window).split(&text);
        assert!(chunks.len() > 1);

        // Only the tail can be short enough to match more than once.
        let last = chunks.len() - 1;
        let mut offsets = Vec::with_capacity(chunks.len());
        let mut from = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.chars().count() <= size, "chunk longer than {size}: {chunk:?}");
            let offset = if i == last {
                assert!(text.ends_with(chunk.as_str()), "last chunk reaches the end");
                text.len() - chunk.len()
            } else {
                from + text[from..].find(chunk.as_str()).expect("chunk is a substring of the document")
            };
            assert!(offset >= from, "chunks move forward");
            offsets.push(offset);
            from = offset + 1;
        }

        assert_eq!(offsets[0], 0);
        for i in 0..last {
            let covered_to = offsets[i] + chunks[i].len();
            if offsets[i + 1] > covered_to {
                assert!(
                    text[covered_to..offsets[i + 1]].trim().is_empty(),
                    "({size}, {overlap}) dropped {:?}",
                    &text[covered_to..offsets[i + 1]]
                );
            }
        }
    }
}

#[test]
fn overlap_must_be_smaller_than_chunk_size() {
    for (size, overlap) in [(100, 100), (100, 150), (0, 0)] {
        let err = Chunker::new(ChunkingConfig { chunk_size: size, overlap, boundary_window: 100 }).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "({size}, {overlap}) -> {err}");
    }
}

#[test]
fn chunk_document_links_chunks_to_their_source() {
    let doc = Document { id: "faq".to_string(), text: sentences("eleven", 24) };
    let chunks = Chunker::default().chunk_document(&doc);
    assert_eq!(chunks.len(), 3);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.source_id, "faq");
        assert_eq!(chunk.chunk_index, i);
    }
}
