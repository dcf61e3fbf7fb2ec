// renderer/retire.rs

/// Deferred release of GPU buffers still referenced by in-flight commands.
/// Disposal requests land here instead of executing immediately; the render
/// thread drains the queue at the frame boundary, after submission, so a
/// buffer is only freed once every draw that references it has been
/// recorded.
#[derive(Default)]
pub struct RetireQueue {
    pending: Vec<wgpu::Buffer>,
}

impl RetireQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, buffer: wgpu::Buffer) {
        self.pending.push(buffer);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Frame-boundary checkpoint: releases everything queued since the last
    /// drain. Only call after the frame's command buffer was submitted.
    pub fn drain(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Releasing {} retired buffers", self.pending.len());
            self.pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_on_empty_queue_is_a_no_op() {
        let mut queue = RetireQueue::new();
        assert!(queue.is_empty());
        queue.drain();
        assert!(queue.is_empty());
    }
}
