//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use prism_core::traits::host::{ComponentConstructor, CustomElement};
use prism_dom::{MemoryDocument, MemoryElementRegistry, memory_host};
use prism_plugin::PluginManager;
use prism_plugin::prelude::PluginConfig;

/// A custom-element class for tests.
#[derive(Debug)]
pub struct TestElement(pub &'static str);

impl CustomElement for TestElement {
    fn class_name(&self) -> &str {
        self.0
    }
}

pub fn element(name: &'static str) -> ComponentConstructor {
    Arc::new(TestElement(name))
}

/// A manager over a fresh in-memory host.
pub struct TestHost {
    pub manager: PluginManager,
    pub elements: Arc<MemoryElementRegistry>,
    pub document: Arc<MemoryDocument>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::with_config(PluginConfig::development())
    }

    pub fn with_config(config: PluginConfig) -> Self {
        let (host, elements, document) = memory_host();
        Self {
            manager: PluginManager::with_config(host, config),
            elements,
            document,
        }
    }
}

/// Ordered record of hook calls, shared between a test and its plugins.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Captures tracing output on the current thread until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
