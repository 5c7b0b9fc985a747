use std::fs;
use std::io::Write;
use tempfile::TempDir;

use kb_core::chunker::ChunkingConfig;
use kb_core::config::Settings;
use kb_core::data_processor::DataProcessor;
use kb_core::Error;

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.md")).unwrap();
    writeln!(f, "  Short text  ").unwrap();

    let processor = DataProcessor::new();
    let chunks = processor.process_directory(dir);

    assert_eq!(chunks.len(), 1, "one small document becomes one chunk");
    assert_eq!(chunks[0].text, "Short text");
    assert_eq!(chunks[0].source_id, "a");
    assert_eq!(chunks[0].chunk_index, 0);
}

#[test]
fn missing_directory_is_an_empty_corpus() {
    let tmp = TempDir::new().unwrap();
    let processor = DataProcessor::new();
    assert!(processor.load_documents(&tmp.path().join("does-not-exist")).is_empty());
    assert!(processor.process_directory(&tmp.path().join("does-not-exist")).is_empty());
}

#[test]
fn file_path_instead_of_directory_is_an_empty_corpus() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("kb.md");
    fs::write(&file, "not a directory").unwrap();
    assert!(DataProcessor::new().load_documents(&file).is_empty());
}

#[test]
fn document_ids_are_file_stems_and_text_is_trimmed() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("refund-policy.md"), "\n\n# Refunds\nWithin 5 days.\n\n").unwrap();

    let docs = DataProcessor::new().load_documents(tmp.path());
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "refund-policy");
    assert_eq!(docs[0].text, "# Refunds\nWithin 5 days.");
}

#[test]
fn empty_and_blank_files_are_skipped() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("empty.md"), "").unwrap();
    fs::write(tmp.path().join("blank.md"), " \n\t \n").unwrap();
    fs::write(tmp.path().join("real.md"), "content").unwrap();

    let docs = DataProcessor::new().load_documents(tmp.path());
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["real"]);
}

#[test]
fn only_top_level_markdown_files_are_loaded() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("shipping.md"), "Ships in two days.").unwrap();
    fs::write(dir.join("LOUD.MD"), "Uppercase extension.").unwrap();
    fs::write(dir.join("notes.txt"), "Plain text is ignored.").unwrap();
    fs::write(dir.join("README"), "No extension.").unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("nested").join("deep.md"), "Not loaded, non-recursive.").unwrap();
    fs::create_dir(dir.join("folder.md")).unwrap();

    let docs = DataProcessor::new().load_documents(dir);
    let mut ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["LOUD", "shipping"]);
}

#[test]
fn unreadable_file_is_skipped_and_loading_continues() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.md"), "alpha bravo").unwrap();
    fs::write(tmp.path().join("broken.md"), [0xff_u8, 0xfe, 0xfd, 0x00, 0xc3]).unwrap();
    fs::write(tmp.path().join("c.md"), "charlie delta").unwrap();

    let docs = DataProcessor::new().load_documents(tmp.path());
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"], "invalid UTF-8 only drops the offending file");
}

#[test]
fn max_documents_limits_loaded_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.md"), "alpha bravo").unwrap();
    fs::write(dir.join("b.md"), "charlie delta").unwrap();

    let processor = DataProcessor::new().with_max_documents(1);
    let chunks = processor.process_directory(dir);

    // Only chunks from one document should be present
    let mut doc_ids = std::collections::HashSet::new();
    for c in &chunks { doc_ids.insert(c.source_id.clone()); }
    assert_eq!(doc_ids.len(), 1, "limited to one source document");
}

#[test]
fn chunks_of_long_document_are_numbered_in_order() {
    let tmp = TempDir::new().unwrap();
    let text = "Every order ships from our central warehouse. ".repeat(40);
    fs::write(tmp.path().join("orders.md"), &text).unwrap();

    let chunks = DataProcessor::new().process_directory(tmp.path());
    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.source_id, "orders");
    }
}

#[test]
fn processor_from_settings_applies_chunking_and_limit() {
    let tmp = TempDir::new().unwrap();
    for name in ["a.md", "b.md", "c.md"] {
        fs::write(tmp.path().join(name), "Refunds are processed quickly. ".repeat(10)).unwrap();
    }

    let mut settings = Settings::default();
    settings.chunking = ChunkingConfig { chunk_size: 120, overlap: 20, boundary_window: 40 };
    settings.kb.max_documents = Some(2);
    let chunks = DataProcessor::from_settings(&settings).expect("processor").process_directory(tmp.path());

    assert!(chunks.iter().all(|c| c.source_id == "a" || c.source_id == "b"));
    assert!(chunks.iter().any(|c| c.source_id == "b"));
    assert!(chunks.iter().all(|c| c.text.chars().count() <= 120));
    assert!(chunks.iter().filter(|c| c.source_id == "a").count() > 1);

    settings.chunking.overlap = 120;
    assert!(matches!(DataProcessor::from_settings(&settings), Err(Error::InvalidConfig(_))));
}
