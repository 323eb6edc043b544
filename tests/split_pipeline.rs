//! Tests d'intégration du pipeline de découpage, pilotés par des stubs
//! shell de ffprobe/ffmpeg (unix uniquement).

#![cfg(unix)]

use std::fs;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use audioscribe::storage::{ChunkId, ChunkStore, StoreError, UploadStream};
use audioscribe::{AudioSplitter, MemoryChunkStore, SplitError, SplitOptions};

/// Stubs d'outils pour un test: ffprobe renvoie une durée fixe, ffmpeg trace
/// chaque invocation dans `calls` et écrit un contenu numéroté en sortie.
struct StubTools {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
    calls: PathBuf,
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn stub_tools(dir: &Path, duration: &str, fail_at_call: Option<usize>) -> StubTools {
    let ffprobe = dir.join("ffprobe");
    write_script(&ffprobe, &format!("#!/bin/sh\necho {}\n", duration));

    let calls = dir.join("ffmpeg-calls");
    fs::write(&calls, "").unwrap();

    let fail_clause = match fail_at_call {
        Some(call) => format!(
            "if [ \"$count\" -eq {} ]; then echo boom >&2; exit 1; fi\n",
            call
        ),
        None => String::new(),
    };
    let ffmpeg = dir.join("ffmpeg");
    write_script(
        &ffmpeg,
        &format!(
            "#!/bin/sh\n\
             count=$(wc -l < {calls})\n\
             count=$((count + 1))\n\
             echo \"$@\" >> {calls}\n\
             {fail}for out; do :; done\n\
             printf 'chunk-data-%s' \"$count\" > \"$out\"\n",
            calls = calls.display(),
            fail = fail_clause
        ),
    );

    StubTools {
        ffprobe,
        ffmpeg,
        calls,
    }
}

fn options(tools: &StubTools, temp_dir: &Path) -> SplitOptions {
    SplitOptions {
        ffmpeg_path: Some(tools.ffmpeg.clone()),
        ffprobe_path: Some(tools.ffprobe.clone()),
        temp_dir: Some(temp_dir.to_path_buf()),
        ..Default::default()
    }
}

fn read_chunk(store: &dyn ChunkStore, id: &ChunkId) -> Vec<u8> {
    let mut reader = store.open_download_stream(id).unwrap();
    let mut contents = Vec::new();
    reader.read_to_end(&mut contents).unwrap();
    contents
}

fn assert_no_temp_residue(temp_dir: &Path) {
    assert_eq!(fs::read_dir(temp_dir).unwrap().count(), 0);
}

/// Store qui rejette les uploads à partir du n-ième appel (base zéro).
struct FailingStore {
    inner: MemoryChunkStore,
    fail_from: usize,
    uploads: AtomicUsize,
}

impl FailingStore {
    fn new(inner: MemoryChunkStore, fail_from: usize) -> Self {
        Self {
            inner,
            fail_from,
            uploads: AtomicUsize::new(0),
        }
    }
}

impl ChunkStore for FailingStore {
    fn open_upload_stream(&self, name: &str) -> Result<Box<dyn UploadStream>, StoreError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        if n >= self.fail_from {
            return Err(StoreError::Backend("upload rejected".to_string()));
        }
        self.inner.open_upload_stream(name)
    }

    fn open_download_stream(&self, id: &ChunkId) -> Result<Box<dyn Read + Send>, StoreError> {
        self.inner.open_download_stream(id)
    }
}

#[test]
fn short_audio_uploads_whole_file_without_invoking_ffmpeg() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "300.000000", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    let ids = splitter.split(&source).unwrap();

    assert_eq!(ids.len(), 1);
    assert_eq!(read_chunk(&store, &ids[0]), b"source-bytes");
    // ffmpeg n'a jamais tourné: son fichier de trace est resté vide.
    assert_eq!(fs::read_to_string(&tools.calls).unwrap(), "");
    assert_no_temp_residue(&temp_dir);
}

#[test]
fn thousand_second_audio_splits_into_two_ordered_chunks() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "1000.000000", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    let ids = splitter.split(&source).unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(read_chunk(&store, &ids[0]), b"chunk-data-1");
    assert_eq!(read_chunk(&store, &ids[1]), b"chunk-data-2");

    let calls = fs::read_to_string(&tools.calls).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("-ss 0 -t 840"));
    assert!(lines[0].contains("-c copy"));
    assert!(lines[1].contains("-ss 840 -t 840"));
    assert_no_temp_residue(&temp_dir);
}

#[test]
fn exact_multiple_duration_produces_exact_segment_count() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "1680.000000", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    let ids = splitter.split(&source).unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(fs::read_to_string(&tools.calls).unwrap().lines().count(), 2);
    assert_no_temp_residue(&temp_dir);
}

#[test]
fn tool_failure_mid_plan_keeps_earlier_chunks_and_aborts() {
    let root = tempfile::tempdir().unwrap();
    // 2000s -> 3 segments; ffmpeg échoue à la deuxième invocation (index 1).
    let tools = stub_tools(root.path(), "2000.000000", Some(2));
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    let err = splitter.split(&source).unwrap_err();

    match err {
        SplitError::ToolExecution { index, code, .. } => {
            assert_eq!(index, 1);
            assert_eq!(code, Some(1));
        }
        other => panic!("expected ToolExecution, got {other:?}"),
    }
    // Pas de rollback: le chunk 0 reste stocké, les suivants n'existent pas.
    assert_eq!(store.len(), 1);
    assert_no_temp_residue(&temp_dir);
}

#[test]
fn storage_failure_reports_index_and_aborts() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "1000.000000", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let inner = MemoryChunkStore::new();
    let failing = FailingStore::new(inner.clone(), 1);
    let splitter = AudioSplitter::new(Arc::new(failing), options(&tools, &temp_dir)).unwrap();
    let err = splitter.split(&source).unwrap_err();

    match err {
        SplitError::Storage { index, .. } => assert_eq!(index, 1),
        other => panic!("expected Storage, got {other:?}"),
    }
    assert_eq!(inner.len(), 1);
    assert_no_temp_residue(&temp_dir);
}

#[test]
fn unparsable_probe_output_is_a_probe_error() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "not-a-number", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    assert!(matches!(
        splitter.split(&source),
        Err(SplitError::Probe { .. })
    ));
    assert!(store.is_empty());
}

#[test]
fn failing_probe_is_a_probe_error() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "300", None);
    write_script(&tools.ffprobe, "#!/bin/sh\necho unreadable >&2\nexit 1\n");
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();
    let source = root.path().join("input.mp3");
    fs::write(&source, b"source-bytes").unwrap();

    let store = MemoryChunkStore::new();
    let splitter =
        AudioSplitter::new(Arc::new(store.clone()), options(&tools, &temp_dir)).unwrap();
    match splitter.split(&source) {
        Err(SplitError::Probe { detail }) => assert!(detail.contains("unreadable")),
        other => panic!("expected Probe, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_source_file_is_a_probe_error() {
    let root = tempfile::tempdir().unwrap();
    let tools = stub_tools(root.path(), "300", None);
    let temp_dir = root.path().join("work");
    fs::create_dir(&temp_dir).unwrap();

    let store = MemoryChunkStore::new();
    let splitter = AudioSplitter::new(Arc::new(store), options(&tools, &temp_dir)).unwrap();
    assert!(matches!(
        splitter.split(Path::new("/nonexistent/input.mp3")),
        Err(SplitError::Probe { .. })
    ));
}
