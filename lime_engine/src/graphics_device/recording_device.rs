/// Recording graphics device (no GPU required)
///
/// Implements `GraphicsDevice` by appending every call to a log. Used by the
/// unit and integration tests, and handy for headless tools that want to
/// inspect the exact call stream a frame produces.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use glam::Mat4;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendFactor, BufferHandle, BufferTarget, BufferUsage, Capabilities, CompressedFormat,
    FormatSupport, GraphicsDevice, PixelFormat, ShaderProgram, TextureHandle, TextureParams,
};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer(BufferHandle),
    DeleteBuffer(BufferHandle),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    BufferData { target: BufferTarget, bytes: usize, usage: BufferUsage },
    CreateTexture(TextureHandle),
    DeleteTextures(Vec<TextureHandle>),
    BindTexture { stage: u32, handle: Option<TextureHandle> },
    SetTextureParams { params: TextureParams, level_count: u32 },
    TexImage2D { level: u32, format: PixelFormat, width: u32, height: u32, bytes: usize },
    CompressedTexImage2D { level: u32, format: CompressedFormat, width: u32, height: u32, bytes: usize },
    TexSubImage2D { x: u32, y: u32, width: u32, height: u32 },
    SetBlendingEnabled(bool),
    BlendFunc(BlendFactor, BlendFactor),
    UseProgram(ShaderProgram),
    SetProjection(Mat4),
    Clear([f32; 4]),
    DrawIndexedTriangles(u32),
}

/// Mutable part of a recording device
struct RecordingState {
    calls: Vec<DeviceCall>,
    next_name: u32,
    context_current: bool,
    generation: u64,
    pending_errors: VecDeque<u32>,
    last_upload: Vec<u8>,
}

/// Graphics device that records calls instead of issuing them
///
/// Clones share the same call log and context state, so a test can hand one
/// clone to the renderer and keep another to inspect or to simulate context
/// loss.
#[derive(Clone)]
pub struct RecordingDevice {
    capabilities: Arc<Capabilities>,
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingDevice {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities: Arc::new(capabilities),
            state: Arc::new(Mutex::new(RecordingState {
                calls: Vec::new(),
                next_name: 1,
                context_current: true,
                generation: 1,
                pending_errors: VecDeque::new(),
                last_upload: Vec::new(),
            })),
        }
    }

    /// Device supporting every compressed format and NPOT textures
    pub fn with_all_formats() -> Self {
        Self::new(Capabilities::with_formats(FormatSupport::all()))
    }

    /// Device supporting no compressed format, POT textures only
    pub fn minimal() -> Self {
        Self::new(Capabilities::with_formats(FormatSupport::empty()))
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: DeviceCall) {
        self.state().calls.push(call);
    }

    /// Copy of the recorded calls
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    /// Return and forget the recorded calls
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.state().calls)
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Bytes passed to the most recent texture or buffer upload
    pub fn last_upload(&self) -> Vec<u8> {
        self.state().last_upload.clone()
    }

    /// Simulate losing the context: the device stops being current
    pub fn lose_context(&self) {
        self.state().context_current = false;
    }

    /// Simulate re-creating the context: a new generation becomes current
    pub fn restore_context(&self) {
        let mut state = self.state();
        state.context_current = true;
        state.generation += 1;
    }

    /// Queue a driver error code for `get_error`
    pub fn push_error(&self, code: u32) {
        self.state().pending_errors.push_back(code);
    }

    fn next_name(&self) -> Result<u32> {
        let mut state = self.state();
        if !state.context_current {
            return Err(Error::BackendError("no current context".to_string()));
        }
        let name = state.next_name;
        state.next_name += 1;
        Ok(name)
    }

    fn record_upload(&self, data: &[u8], call: DeviceCall) {
        let mut state = self.state();
        state.last_upload = data.to_vec();
        state.calls.push(call);
    }
}

impl GraphicsDevice for RecordingDevice {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn is_context_current(&self) -> bool {
        self.state().context_current
    }

    fn context_generation(&self) -> u64 {
        self.state().generation
    }

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let handle = BufferHandle::new(self.next_name()?).ok_or(Error::OutOfMemory)?;
        self.record(DeviceCall::CreateBuffer(handle));
        Ok(handle)
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        self.record(DeviceCall::DeleteBuffer(handle));
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: Option<BufferHandle>) {
        self.record(DeviceCall::BindBuffer(target, handle));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record_upload(data, DeviceCall::BufferData { target, bytes: data.len(), usage });
    }

    fn create_texture(&mut self) -> Result<TextureHandle> {
        let handle = TextureHandle::new(self.next_name()?).ok_or(Error::OutOfMemory)?;
        self.record(DeviceCall::CreateTexture(handle));
        Ok(handle)
    }

    fn delete_textures(&mut self, handles: &[TextureHandle]) {
        self.record(DeviceCall::DeleteTextures(handles.to_vec()));
    }

    fn bind_texture(&mut self, stage: u32, handle: Option<TextureHandle>) {
        self.record(DeviceCall::BindTexture { stage, handle });
    }

    fn set_texture_params(&mut self, params: &TextureParams, level_count: u32) {
        self.record(DeviceCall::SetTextureParams { params: *params, level_count });
    }

    fn tex_image_2d(&mut self, level: u32, format: PixelFormat, width: u32, height: u32, data: &[u8]) {
        self.record_upload(
            data,
            DeviceCall::TexImage2D { level, format, width, height, bytes: data.len() },
        );
    }

    fn compressed_tex_image_2d(
        &mut self,
        level: u32,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        self.record_upload(
            data,
            DeviceCall::CompressedTexImage2D { level, format, width, height, bytes: data.len() },
        );
    }

    fn tex_sub_image_2d(&mut self, x: u32, y: u32, width: u32, height: u32, data: &[u8]) {
        self.record_upload(data, DeviceCall::TexSubImage2D { x, y, width, height });
    }

    fn set_blending_enabled(&mut self, enabled: bool) {
        self.record(DeviceCall::SetBlendingEnabled(enabled));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(DeviceCall::BlendFunc(src, dst));
    }

    fn use_program(&mut self, program: ShaderProgram) {
        self.record(DeviceCall::UseProgram(program));
    }

    fn set_projection(&mut self, projection: &Mat4) {
        self.record(DeviceCall::SetProjection(*projection));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.record(DeviceCall::Clear(color));
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        self.record(DeviceCall::DrawIndexedTriangles(index_count));
    }

    fn get_error(&mut self) -> Option<u32> {
        self.state().pending_errors.pop_front()
    }
}

#[cfg(test)]
#[path = "recording_device_tests.rs"]
mod tests;
