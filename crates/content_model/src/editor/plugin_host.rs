// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, trace, warn};

use super::options::EditorOptions;
use super::plugin::{EditorPlugin, PluginEvent};
use super::EditorCore;

pub type DeferredTask = Box<dyn FnOnce(&mut EditorCore)>;

/// Work handed to an editor that was busy at the time. It runs as soon
/// as the call into the editor that was in progress returns. Handles
/// don't keep the editor alive.
#[derive(Clone, Default)]
pub struct DeferredTasks(Rc<RefCell<VecDeque<DeferredTask>>>);

impl DeferredTasks {
    pub fn push(&self, task: DeferredTask) {
        self.0.borrow_mut().push_back(task);
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn pop(&self) -> Option<DeferredTask> {
        self.0.borrow_mut().pop_front()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// An editor with its plugins. Events are delivered to plugins in
/// registration order; events plugins raise while handling one are
/// delivered after it, until the queue is empty.
pub struct Editor {
    core: EditorCore,
    plugins: Vec<Box<dyn EditorPlugin>>,
    deferred: DeferredTasks,
}

impl Editor {
    pub fn new(options: EditorOptions, plugins: Vec<Box<dyn EditorPlugin>>) -> Self {
        let mut editor = Self {
            core: EditorCore::new(options),
            plugins,
            deferred: DeferredTasks::default(),
        };
        for plugin in &mut editor.plugins {
            debug!("Initializing plugin {}", plugin.name());
            plugin.initialize(&mut editor.core);
        }
        editor.trigger_event(PluginEvent::EditorReady);
        editor
    }

    /// The editor behind a shared handle, for callbacks that may outlive
    /// it.
    pub fn shared(options: EditorOptions, plugins: Vec<Box<dyn EditorPlugin>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(options, plugins)))
    }

    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    /// Use the core, then deliver whatever events that raised.
    pub fn with_core<R>(&mut self, f: impl FnOnce(&mut EditorCore) -> R) -> R {
        let result = f(&mut self.core);
        self.flush_events();
        result
    }

    /// A handle for queueing work while the editor is borrowed.
    pub fn deferred_tasks(&self) -> DeferredTasks {
        self.deferred.clone()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Deliver `event`, then everything it caused.
    pub fn trigger_event(&mut self, event: PluginEvent) {
        if self.core.is_disposed() {
            return;
        }
        self.dispatch(&event);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        loop {
            while let Some(task) = self.deferred.pop() {
                if self.core.is_disposed() {
                    warn!("Dropping deferred work: {}", crate::Error::Disposed);
                    self.deferred.clear();
                    break;
                }
                task(&mut self.core);
            }
            let events = self.core.take_pending_events();
            if events.is_empty() {
                if self.deferred.is_empty() {
                    break;
                }
                continue;
            }
            for event in &events {
                self.dispatch(event);
            }
        }
    }

    fn dispatch(&mut self, event: &PluginEvent) {
        trace!("Dispatching {}", event.event_type());
        let exclusive = self
            .plugins
            .iter()
            .position(|p| p.will_handle_event_exclusively(event, &self.core));
        match exclusive {
            Some(index) => self.plugins[index].on_plugin_event(event, &mut self.core),
            None => {
                for plugin in &mut self.plugins {
                    plugin.on_plugin_event(event, &mut self.core);
                }
            }
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Tell plugins the editor is going away, then dispose them in
    /// reverse order.
    pub fn dispose(&mut self) {
        if self.core.is_disposed() {
            return;
        }
        self.dispatch(&PluginEvent::BeforeDispose);
        for plugin in self.plugins.iter_mut().rev() {
            plugin.dispose();
        }
        self.core.dispose();
        self.deferred.clear();
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::editor::{KeyboardEventInfo, PluginEventType};

    /// Records the events it sees into a shared log.
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        exclusive: Option<PluginEventType>,
    }

    impl EditorPlugin for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, editor: &mut EditorCore) {
            editor.attach_dom_event("focus");
        }

        fn will_handle_event_exclusively(&self, event: &PluginEvent, _: &EditorCore) -> bool {
            Some(event.event_type()) == self.exclusive
        }

        fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.name, event.event_type()));
            if let PluginEvent::KeyDown(_) = event {
                editor.focus();
            }
        }
    }

    fn editor(log: &Rc<RefCell<Vec<String>>>, exclusive: Option<PluginEventType>) -> Editor {
        let plugins: Vec<Box<dyn EditorPlugin>> = vec![
            Box::new(Recorder {
                name: "first",
                log: log.clone(),
                exclusive: None,
            }),
            Box::new(Recorder {
                name: "second",
                log: log.clone(),
                exclusive,
            }),
        ];
        Editor::new(EditorOptions::new(), plugins)
    }

    #[test]
    fn plugins_see_events_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut editor = editor(&log, None);
        editor.trigger_event(PluginEvent::KeyDown(KeyboardEventInfo::key("a")));

        assert_that!(log.borrow().clone()).is_equal_to(vec![
            "first:editorReady".to_owned(),
            "second:editorReady".to_owned(),
            "first:keyDown".to_owned(),
            "second:keyDown".to_owned(),
            "first:domEvent".to_owned(),
            "second:domEvent".to_owned(),
        ]);
    }

    #[test]
    fn exclusive_plugin_is_the_only_one_told() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut editor = editor(&log, Some(PluginEventType::KeyUp));
        log.borrow_mut().clear();
        editor.trigger_event(PluginEvent::KeyUp(KeyboardEventInfo::key("a")));

        assert_that!(log.borrow().clone()).is_equal_to(vec!["second:keyUp".to_owned()]);
    }

    #[test]
    fn deferred_work_runs_when_the_current_call_returns() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut editor = editor(&log, None);
        let tasks = editor.deferred_tasks();
        log.borrow_mut().clear();

        editor.with_core(|core| {
            tasks.push(Box::new(|core: &mut EditorCore| core.focus()));
            assert_that!(core.has_focus()).is_false();
        });

        assert_that!(editor.core().has_focus()).is_true();
        assert_that!(tasks.is_empty()).is_true();
        assert_that!(log.borrow().clone()).is_equal_to(vec![
            "first:domEvent".to_owned(),
            "second:domEvent".to_owned(),
        ]);
    }

    #[test]
    fn disposed_editor_delivers_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut editor = editor(&log, None);
        editor.dispose();
        log.borrow_mut().clear();
        editor.trigger_event(PluginEvent::SelectionChanged);

        assert_that!(log.borrow().clone()).is_empty();
        assert_that!(editor.is_disposed()).is_true();
    }
}
