use std::{
    path::PathBuf,
    sync::mpsc::{self, channel, TryRecvError},
    thread,
};

use anyhow::Context;

/// A parsed glTF file, ready to be spawned into the scene.
pub struct GltfAsset {
    pub path: PathBuf,
    pub document: gltf::Document,
    pub buffers: Vec<gltf::buffer::Data>,
}

impl GltfAsset {
    pub fn import(path: PathBuf) -> anyhow::Result<Self> {
        let (document, buffers, _images) = gltf::import(&path)
            .with_context(|| format!("Failed to import glTF file {}", path.display()))?;

        Ok(Self {
            path,
            document,
            buffers,
        })
    }

    pub fn default_scene(&self) -> anyhow::Result<gltf::Scene> {
        self.document
            .default_scene()
            .or_else(|| self.document.scenes().next())
            .with_context(|| format!("No scenes in {}", self.path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Pending,
    Finished,
}

/// Imports a glTF file on a worker thread.
///
/// The frame loop polls it without blocking. Exactly one result is produced.
pub struct ModelLoader {
    receiver: mpsc::Receiver<anyhow::Result<GltfAsset>>,
    state: LoadState,
}

impl ModelLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::spawn_with(move || GltfAsset::import(path))
    }

    fn spawn_with<F>(load: F) -> Self
    where
        F: 'static + Send + FnOnce() -> anyhow::Result<GltfAsset>,
    {
        let (sender, receiver) = channel();

        thread::spawn(move || {
            // The receiver is gone if the demo shut down first.
            let _ = sender.send(load());
        });

        Self {
            receiver,
            state: LoadState::Pending,
        }
    }

    /// Returns the result once, on the first poll after the worker finished.
    pub fn poll(&mut self) -> Option<anyhow::Result<GltfAsset>> {
        if self.state == LoadState::Finished {
            return None;
        }

        match self.receiver.try_recv() {
            Ok(result) => {
                self.state = LoadState::Finished;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.state = LoadState::Finished;
                Some(Err(anyhow::anyhow!("Model loader thread exited without a result")))
            }
        }
    }
}
