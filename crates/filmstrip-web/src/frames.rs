//! `requestAnimationFrame`-backed frame scheduler

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use filmstrip_core::scroll::{FrameHandle, FrameScheduler, FrameTask};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Receives each frame callback with the rAF timestamp
pub type FrameSink = Rc<dyn Fn(FrameHandle, FrameTask, f64)>;

#[derive(Default)]
struct Callbacks {
    /// Scheduled callbacks by handle, with the browser's request id
    live: HashMap<u64, (i32, FrameCallback)>,
    /// Callbacks that already ran or were cancelled. A closure must not be
    /// dropped while it is executing, so these are freed on the next request.
    spent: Vec<FrameCallback>,
}

pub struct RafScheduler {
    window: Window,
    sink: FrameSink,
    next_handle: Rc<Cell<u64>>,
    callbacks: Rc<RefCell<Callbacks>>,
}

impl RafScheduler {
    pub fn new(window: Window, sink: FrameSink) -> Self {
        Self {
            window,
            sink,
            next_handle: Rc::new(Cell::new(0)),
            callbacks: Rc::new(RefCell::new(Callbacks::default())),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, task: FrameTask) -> Option<FrameHandle> {
        self.callbacks.borrow_mut().spent.clear();

        let key = self.next_handle.get() + 1;
        self.next_handle.set(key);
        let handle = FrameHandle(key);

        let sink = Rc::clone(&self.sink);
        // The table owns this closure, so the closure only holds a weak handle back
        let callbacks: Weak<RefCell<Callbacks>> = Rc::downgrade(&self.callbacks);
        let callback = Closure::wrap(Box::new(move |timestamp: f64| {
            let Some(callbacks) = callbacks.upgrade() else {
                return;
            };
            sink(handle, task, timestamp);
            let mut callbacks = callbacks.borrow_mut();
            if let Some((_, callback)) = callbacks.live.remove(&key) {
                callbacks.spent.push(callback);
            }
        }) as Box<dyn FnMut(f64)>);

        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(request_id) => {
                self.callbacks
                    .borrow_mut()
                    .live
                    .insert(key, (request_id, callback));
                Some(handle)
            }
            Err(err) => {
                tracing::warn!("requestAnimationFrame failed: {:?}", err);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut callbacks = self.callbacks.borrow_mut();
        if let Some((request_id, callback)) = callbacks.live.remove(&handle.0) {
            let _ = self.window.cancel_animation_frame(request_id);
            callbacks.spent.push(callback);
        }
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        let mut callbacks = self.callbacks.borrow_mut();
        for (_, (request_id, _)) in callbacks.live.drain() {
            let _ = self.window.cancel_animation_frame(request_id);
        }
    }
}
