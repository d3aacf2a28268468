/// Rendering-thread work queue
///
/// Native objects may only be touched on the thread that owns the context.
/// Any thread can push work through a `RenderingQueue`; the rendering thread
/// drains it with `RenderingDispatcher::run_pending` at the start of a frame.

use crate::graphics_device::GraphicsDevice;

/// Unit of work executed on the rendering thread
pub type RenderingTask = Box<dyn FnOnce(&mut dyn GraphicsDevice) + Send>;

/// Cloneable, thread-safe sending side of the rendering queue
#[derive(Clone)]
pub struct RenderingQueue {
    sender: flume::Sender<RenderingTask>,
}

impl RenderingQueue {
    /// Queue `task` for the next frame
    ///
    /// Once the dispatcher is gone there is no context left to act on, and the
    /// task is dropped.
    pub fn invoke<F>(&self, task: F)
    where
        F: FnOnce(&mut dyn GraphicsDevice) + Send + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            crate::engine_trace!("lime::RenderingQueue", "Dispatcher dropped, task discarded");
        }
    }

    /// Queue `task`, skipped unless a context is current when it runs
    pub fn invoke_if_current<F>(&self, task: F)
    where
        F: FnOnce(&mut dyn GraphicsDevice) + Send + 'static,
    {
        self.invoke(move |device| {
            if device.is_context_current() {
                task(device);
            }
        });
    }

    /// Queue `task`, skipped unless the context of `generation` is still current
    ///
    /// Used to release native handles: a handle created by an earlier context
    /// generation is already gone with that context.
    pub fn invoke_in_context<F>(&self, generation: u64, task: F)
    where
        F: FnOnce(&mut dyn GraphicsDevice) + Send + 'static,
    {
        self.invoke(move |device| {
            if device.is_context_current() && device.context_generation() == generation {
                task(device);
            }
        });
    }
}

/// Receiving side of the rendering queue, owned by the rendering thread
pub struct RenderingDispatcher {
    receiver: flume::Receiver<RenderingTask>,
    queue: RenderingQueue,
}

impl RenderingDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { receiver, queue: RenderingQueue { sender } }
    }

    /// A new sending handle for this dispatcher
    pub fn queue(&self) -> RenderingQueue {
        self.queue.clone()
    }

    /// Number of tasks waiting
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run the tasks queued so far, returning how many ran
    ///
    /// Tasks queued by the tasks themselves wait for the next call.
    pub fn run_pending(&self, device: &mut dyn GraphicsDevice) -> usize {
        let count = self.receiver.len();
        let mut executed = 0;
        for _ in 0..count {
            match self.receiver.try_recv() {
                Ok(task) => {
                    task(device);
                    executed += 1;
                }
                Err(_) => break,
            }
        }
        executed
    }
}

impl Default for RenderingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "rendering_dispatcher_tests.rs"]
mod tests;
