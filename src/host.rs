// Browser-side adapters. JS supplies plain functions; the core decides when to call them.
//
// Expected wiring:
//   request_frame(id)  -> ids.set(id, requestAnimationFrame(t => effect.frame(id, t)))
//   cancel_frame(id)   -> cancelAnimationFrame(ids.get(id))
//   disconnect()       -> resizeObserver.disconnect()

use js_sys::Function;
use wasm_bindgen::JsValue;

use crate::frame_loop::{FrameHandle, FrameScheduler};
use crate::viewport::SizeObserver;

/// Frame scheduler backed by host callbacks around requestAnimationFrame.
pub struct JsFrameScheduler {
    request: Function,
    cancel: Function,
}

impl JsFrameScheduler {
    pub fn new(request: Function, cancel: Function) -> Self {
        JsFrameScheduler { request, cancel }
    }
}

impl FrameScheduler for JsFrameScheduler {
    fn request_frame(&mut self, handle: FrameHandle) {
        let id = JsValue::from(handle.as_u32());
        if let Err(err) = self.request.call1(&JsValue::NULL, &id) {
            log::error!("request_frame({}) failed: {:?}", handle.as_u32(), err);
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let id = JsValue::from(handle.as_u32());
        if let Err(err) = self.cancel.call1(&JsValue::NULL, &id) {
            log::error!("cancel_frame({}) failed: {:?}", handle.as_u32(), err);
        }
    }
}

/// Size observer whose disconnect is a host callback.
pub struct JsSizeObserver {
    disconnect: Function,
}

impl JsSizeObserver {
    pub fn new(disconnect: Function) -> Self {
        JsSizeObserver { disconnect }
    }
}

impl SizeObserver for JsSizeObserver {
    fn disconnect(&mut self) {
        if let Err(err) = self.disconnect.call0(&JsValue::NULL) {
            log::error!("size observer disconnect failed: {:?}", err);
        }
    }
}
