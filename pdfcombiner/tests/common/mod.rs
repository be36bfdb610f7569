//! Shared helpers for the pipeline integration tests.
//!
//! Provides tiny in-memory PDF fixtures and instrumented `BlobStore`,
//! `DocumentCombiner`, and `Notifier` implementations that record what the
//! job actually did to them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use lopdf::dictionary;
use base64::engine::general_purpose::STANDARD;

use pdfcombiner::JobReport;
use pdfcombiner::error::Result;
use pdfcombiner::merge::{DocumentCombiner, PdfMerger, ResolvedDocument};
use pdfcombiner::notify::{Notifier, NotifyError};
use pdfcombiner::storage::{BlobStore, MemoryStore, StorageError, StorageResult};

/// Produce a minimal single-page PDF as raw bytes.
pub fn pdf_bytes() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.4");

    let catalog_id = doc.new_object_id();
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let catalog = lopdf::dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    let pages = lopdf::dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };

    let page = lopdf::dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };

    doc.objects.insert(catalog_id, catalog.into());
    doc.objects.insert(pages_id, pages.into());
    doc.objects.insert(page_id, page.into());

    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Base64-encode a minimal PDF, as an inline request payload would carry it.
pub fn inline_pdf_data() -> String {
    STANDARD.encode(pdf_bytes())
}

/// Memory store that counts get/put calls.
pub struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for CountingStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, bytes, content_type).await
    }
}

/// Store whose puts always fail, counting the attempts.
pub struct FailingPutStore {
    inner: MemoryStore,
    put_attempts: AtomicUsize,
}

impl FailingPutStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            put_attempts: AtomicUsize::new(0),
        }
    }

    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FailingPutStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(key).await
    }

    async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::init("store unavailable"))
    }
}

/// Store that delays each get by a per-key duration, to shuffle completion
/// order during the resolution phase.
pub struct DelayedStore {
    inner: MemoryStore,
    delays: HashMap<String, Duration>,
}

impl DelayedStore {
    pub fn new(inner: MemoryStore, delays: HashMap<String, Duration>) -> Self {
        Self { inner, delays }
    }
}

#[async_trait]
impl BlobStore for DelayedStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.inner.put(key, bytes, content_type).await
    }
}

/// Combiner that records the document order it was invoked with.
///
/// With a delegate it performs a real merge; without one it returns a
/// fixed placeholder artifact.
pub struct RecordingCombiner {
    calls: Mutex<Vec<Vec<String>>>,
    delegate: Option<PdfMerger>,
}

impl RecordingCombiner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delegate: None,
        }
    }

    pub fn delegating() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delegate: Some(PdfMerger::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentCombiner for RecordingCombiner {
    async fn combine(&self, inputs: &[ResolvedDocument]) -> Result<Vec<u8>> {
        let names = inputs.iter().map(|d| d.name.clone()).collect();
        self.calls.lock().unwrap().push(names);

        match &self.delegate {
            Some(merger) => merger.combine(inputs).await,
            None => Ok(b"combined".to_vec()),
        }
    }
}

/// Notifier that records every report it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    reports: Mutex<Vec<JobReport>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<JobReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, report: &JobReport) -> std::result::Result<(), NotifyError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
