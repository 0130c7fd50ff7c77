//! A backend driven by the test, recording every call made on it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::error::VisualError;
use super::strip::render_strip;
use super::types::{
    ContainerId, EventSink, VisualEventKind, VisualizationBackend, VisualizationHandle,
    VisualizerConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { handle: usize, container: ContainerId },
    Load { handle: usize, url: String },
    PlayPause { handle: usize },
    Destroy { handle: usize },
}

#[derive(Debug, Default)]
pub struct Script {
    pub calls: Vec<Call>,
    /// Handles created and not yet destroyed.
    pub live: Vec<(usize, ContainerId)>,
    /// Times a handle was created while another one still held its container.
    pub container_overlaps: usize,
    /// Sinks handed to each handle, by creation index. Kept after destroy so
    /// tests can play a misbehaving library that emits late.
    pub sinks: Vec<Option<EventSink>>,
    pub durations: HashMap<String, f64>,
    pub fail_next_create: bool,
    pub fail_next_load: bool,
}

impl Script {
    pub fn creates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn play_pauses(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::PlayPause { .. }))
            .count()
    }
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    pub script: Rc<RefCell<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(self, url: &str, seconds: f64) -> Self {
        self.script
            .borrow_mut()
            .durations
            .insert(url.to_string(), seconds);
        self
    }

    /// Emit `kind` as if the library behind handle `index` fired it.
    pub fn emit(&self, index: usize, kind: VisualEventKind) -> bool {
        let sink = self
            .script
            .borrow()
            .sinks
            .get(index)
            .cloned()
            .flatten();
        sink.is_some_and(|s| s.emit(kind))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }
}

impl VisualizationBackend for ScriptedBackend {
    type Handle = ScriptedHandle;

    fn create(
        &mut self,
        config: &VisualizerConfig,
        container: &ContainerId,
    ) -> Result<ScriptedHandle, VisualError> {
        let mut script = self.script.borrow_mut();
        if std::mem::take(&mut script.fail_next_create) {
            return Err(VisualError::Output("scripted create failure".to_string()));
        }

        let index = script.sinks.len();
        if script.live.iter().any(|(_, c)| c == container) {
            script.container_overlaps += 1;
        }
        script.live.push((index, container.clone()));
        script.sinks.push(None);
        script.calls.push(Call::Create {
            handle: index,
            container: container.clone(),
        });

        Ok(ScriptedHandle {
            index,
            script: self.script.clone(),
            config: config.clone(),
            url: None,
            playing: false,
            destroyed: false,
        })
    }
}

pub struct ScriptedHandle {
    index: usize,
    script: Rc<RefCell<Script>>,
    config: VisualizerConfig,
    url: Option<String>,
    playing: bool,
    destroyed: bool,
}

impl VisualizationHandle for ScriptedHandle {
    fn subscribe(&mut self, sink: EventSink) {
        self.script.borrow_mut().sinks[self.index] = Some(sink);
    }

    fn load(&mut self, url: &str) -> Result<(), VisualError> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Load {
            handle: self.index,
            url: url.to_string(),
        });
        if std::mem::take(&mut script.fail_next_load) {
            return Err(VisualError::Disconnected);
        }
        self.url = Some(url.to_string());
        Ok(())
    }

    fn play_pause(&mut self) {
        self.script
            .borrow_mut()
            .calls
            .push(Call::PlayPause { handle: self.index });
        self.playing = !self.playing;
        let kind = if self.playing {
            VisualEventKind::Play
        } else {
            VisualEventKind::Pause
        };
        let sink = self.script.borrow().sinks[self.index].clone();
        if let Some(sink) = sink {
            sink.emit(kind);
        }
    }

    fn duration(&self) -> Option<f64> {
        let url = self.url.as_ref()?;
        Some(
            self.script
                .borrow()
                .durations
                .get(url)
                .copied()
                .unwrap_or(120.0),
        )
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut script = self.script.borrow_mut();
        script.live.retain(|(i, _)| *i != self.index);
        script.calls.push(Call::Destroy { handle: self.index });
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        render_strip(self.url.as_ref().map(|_| 0.0), &self.config, area, buf);
    }
}
