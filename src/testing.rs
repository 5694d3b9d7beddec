//! In-memory stand-ins for the host, the toolkit and the GL driver.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::context::{ContextRole, ContextSwitch};
use crate::error::{Error, Result};
use crate::gl::{gl_enum, GlApi};
use crate::host::{SizeCallback, StandardCursor, WindowSystem};
use crate::toolkit::{SceneNotifier, WindowEventKind, WindowNotifier};
use crate::types::{CursorHandle, WindowHandle};

/// The OS window every fake refers to.
pub const WINDOW: WindowHandle = WindowHandle(0x5EED);

static SERIAL: Mutex<()> = Mutex::new(());

/// Held by every test that creates a window adapter, since only one may be
/// alive per process.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The slice of GL state the state snapshot covers, as the fake sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observed {
    pub blend_enabled: bool,
    pub blend_func: [u32; 4],
    pub program: u32,
    pub active_texture: u32,
    pub texture_unit_0: u32,
    pub vertex_array: u32,
    pub array_buffer: u32,
    pub viewport: [i32; 4],
}

#[derive(Clone, Debug)]
pub struct GlModel {
    next_name: u32,

    pub textures: HashSet<u32>,
    pub framebuffers: HashSet<u32>,
    pub programs: HashSet<u32>,
    pub shaders: HashSet<u32>,
    pub vertex_arrays: HashSet<u32>,
    pub buffers: HashSet<u32>,

    pub blend_enabled: bool,
    pub blend_func: [u32; 4],
    pub program: u32,
    pub active_texture: u32,
    /// `GL_TEXTUREi` unit to its 2D binding.
    pub texture_units: HashMap<u32, u32>,
    pub vertex_array: u32,
    pub array_buffer: u32,
    pub framebuffer: u32,
    pub viewport: [i32; 4],

    /// Framebuffer to its color attachment.
    pub attachments: HashMap<u32, u32>,
    pub texture_sizes: HashMap<u32, (i32, i32)>,
    pub tex_image_calls: usize,
    pub attrib_bindings: HashMap<(u32, u32), String>,
    pub uniforms: HashMap<u32, i32>,
    pub draw_calls: usize,

    /// Returned (once) by the next `get_error`.
    pub pending_error: u32,
    pub fail_compile: bool,
    pub incomplete_framebuffer: bool,
    pub record_draw_state: bool,
    /// State at the most recent draw, when `record_draw_state` is set.
    pub last_draw: Option<Observed>,

    /// Object name to the context current when it was created, for a fake
    /// built with [`FakeGl::tracking`].
    pub created_in: HashMap<u32, Option<ContextRole>>,
    /// Object name to the context current when it was deleted.
    pub deleted_in: HashMap<u32, Option<ContextRole>>,
}

impl GlModel {
    fn name(&mut self, role: Option<ContextRole>) -> u32 {
        self.next_name += 1;
        self.created_in.insert(self.next_name, role);
        self.next_name
    }

    /// No GL object is alive.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
            && self.framebuffers.is_empty()
            && self.programs.is_empty()
            && self.shaders.is_empty()
            && self.vertex_arrays.is_empty()
            && self.buffers.is_empty()
    }

    fn observed(&self) -> Observed {
        Observed {
            blend_enabled: self.blend_enabled,
            blend_func: self.blend_func,
            program: self.program,
            active_texture: self.active_texture,
            texture_unit_0: self.texture_units.get(&glow::TEXTURE0).copied().unwrap_or(0),
            vertex_array: self.vertex_array,
            array_buffer: self.array_buffer,
            viewport: self.viewport,
        }
    }
}

/// A single-threaded GL "driver" that tracks object lifetimes and bindings.
pub struct FakeGl {
    model: RefCell<GlModel>,
    contexts: Option<FakeContexts>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            contexts: None,
            model: RefCell::new(GlModel {
                next_name: 0,
                textures: HashSet::new(),
                framebuffers: HashSet::new(),
                programs: HashSet::new(),
                shaders: HashSet::new(),
                vertex_arrays: HashSet::new(),
                buffers: HashSet::new(),
                blend_enabled: false,
                blend_func: [glow::ONE, glow::ZERO, glow::ONE, glow::ZERO],
                program: 0,
                active_texture: glow::TEXTURE0,
                texture_units: HashMap::new(),
                vertex_array: 0,
                array_buffer: 0,
                framebuffer: 0,
                viewport: [0; 4],
                attachments: HashMap::new(),
                texture_sizes: HashMap::new(),
                tex_image_calls: 0,
                attrib_bindings: HashMap::new(),
                uniforms: HashMap::new(),
                draw_calls: 0,
                pending_error: glow::NO_ERROR,
                fail_compile: false,
                incomplete_framebuffer: false,
                record_draw_state: false,
                last_draw: None,
                created_in: HashMap::new(),
                deleted_in: HashMap::new(),
            }),
        }
    }

    /// A fake that notes which of `contexts` is current whenever an object
    /// is created or deleted.
    pub fn tracking(contexts: &FakeContexts) -> Self {
        Self {
            contexts: Some(contexts.clone()),
            ..Self::new()
        }
    }

    fn role(&self) -> Option<ContextRole> {
        self.contexts.as_ref().and_then(FakeContexts::current)
    }

    fn create(&self, set: fn(&mut GlModel) -> &mut HashSet<u32>) -> u32 {
        let role = self.role();
        self.with(|m| {
            let name = m.name(role);
            set(m).insert(name);
            name
        })
    }

    fn delete(&self, name: u32, set: fn(&mut GlModel) -> &mut HashSet<u32>) {
        let role = self.role();
        self.with(|m| {
            if set(m).remove(&name) {
                m.deleted_in.insert(name, role);
            }
        });
    }

    pub fn model(&self) -> GlModel {
        self.model.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut GlModel) -> R) -> R {
        f(&mut self.model.borrow_mut())
    }

    pub fn observed(&self) -> Observed {
        self.model.borrow().observed()
    }
}

impl GlApi for FakeGl {
    unsafe fn get_integer(&self, pname: u32) -> i32 {
        let m = self.model.borrow();
        let value = match pname {
            glow::BLEND_SRC_RGB => m.blend_func[0],
            glow::BLEND_DST_RGB => m.blend_func[1],
            glow::BLEND_SRC_ALPHA => m.blend_func[2],
            glow::BLEND_DST_ALPHA => m.blend_func[3],
            glow::CURRENT_PROGRAM => m.program,
            glow::ACTIVE_TEXTURE => m.active_texture,
            glow::TEXTURE_BINDING_2D => m.texture_units.get(&m.active_texture).copied().unwrap_or(0),
            glow::VERTEX_ARRAY_BINDING => m.vertex_array,
            glow::ARRAY_BUFFER_BINDING => m.array_buffer,
            glow::FRAMEBUFFER_BINDING => m.framebuffer,
            _ => 0,
        };
        gl_enum(value)
    }

    unsafe fn get_integers(&self, pname: u32, out: &mut [i32]) {
        if pname == glow::VIEWPORT {
            out.copy_from_slice(&self.model.borrow().viewport);
        }
    }

    unsafe fn is_enabled(&self, cap: u32) -> bool {
        cap == glow::BLEND && self.model.borrow().blend_enabled
    }

    unsafe fn enable(&self, cap: u32) {
        if cap == glow::BLEND {
            self.with(|m| m.blend_enabled = true);
        }
    }

    unsafe fn disable(&self, cap: u32) {
        if cap == glow::BLEND {
            self.with(|m| m.blend_enabled = false);
        }
    }

    unsafe fn blend_func(&self, src: u32, dst: u32) {
        self.with(|m| m.blend_func = [src, dst, src, dst]);
    }

    unsafe fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.with(|m| m.blend_func = [src_rgb, dst_rgb, src_alpha, dst_alpha]);
    }

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.with(|m| m.viewport = [x, y, width, height]);
    }

    unsafe fn get_error(&self) -> u32 {
        self.with(|m| std::mem::replace(&mut m.pending_error, glow::NO_ERROR))
    }

    unsafe fn use_program(&self, program: u32) {
        self.with(|m| m.program = program);
    }

    unsafe fn active_texture(&self, unit: u32) {
        self.with(|m| m.active_texture = unit);
    }

    unsafe fn bind_texture(&self, _target: u32, texture: u32) {
        self.with(|m| {
            let unit = m.active_texture;
            m.texture_units.insert(unit, texture);
        });
    }

    unsafe fn bind_vertex_array(&self, vertex_array: u32) {
        self.with(|m| m.vertex_array = vertex_array);
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: u32) {
        if target == glow::ARRAY_BUFFER {
            self.with(|m| m.array_buffer = buffer);
        }
    }

    unsafe fn bind_framebuffer(&self, _target: u32, framebuffer: u32) {
        self.with(|m| m.framebuffer = framebuffer);
    }

    unsafe fn create_texture(&self) -> Result<u32> {
        Ok(self.create(|m| &mut m.textures))
    }

    unsafe fn delete_texture(&self, texture: u32) {
        self.delete(texture, |m| &mut m.textures);
        self.with(|m| {
            m.texture_sizes.remove(&texture);
            for bound in m.texture_units.values_mut() {
                if *bound == texture {
                    *bound = 0;
                }
            }
        });
    }

    unsafe fn tex_image_2d_empty(
        &self,
        _target: u32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _format: u32,
        _ty: u32,
    ) {
        self.with(|m| {
            let texture = m.texture_units.get(&m.active_texture).copied().unwrap_or(0);
            m.texture_sizes.insert(texture, (width, height));
            m.tex_image_calls += 1;
        });
    }

    unsafe fn tex_parameter_i32(&self, _target: u32, _pname: u32, _value: i32) {}

    unsafe fn create_framebuffer(&self) -> Result<u32> {
        Ok(self.create(|m| &mut m.framebuffers))
    }

    unsafe fn delete_framebuffer(&self, framebuffer: u32) {
        self.delete(framebuffer, |m| &mut m.framebuffers);
        self.with(|m| {
            m.attachments.remove(&framebuffer);
            if m.framebuffer == framebuffer {
                m.framebuffer = 0;
            }
        });
    }

    unsafe fn framebuffer_texture_2d(
        &self,
        _target: u32,
        _attachment: u32,
        _texture_target: u32,
        texture: u32,
        _level: i32,
    ) {
        self.with(|m| {
            let framebuffer = m.framebuffer;
            if texture == 0 {
                m.attachments.remove(&framebuffer);
            } else {
                m.attachments.insert(framebuffer, texture);
            }
        });
    }

    unsafe fn check_framebuffer_status(&self, _target: u32) -> u32 {
        let m = self.model.borrow();
        if m.incomplete_framebuffer {
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT
        } else if m.attachments.contains_key(&m.framebuffer) {
            glow::FRAMEBUFFER_COMPLETE
        } else {
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
        }
    }

    unsafe fn create_program(&self) -> Result<u32> {
        Ok(self.create(|m| &mut m.programs))
    }

    unsafe fn delete_program(&self, program: u32) {
        self.delete(program, |m| &mut m.programs);
    }

    unsafe fn create_shader(&self, _shader_type: u32) -> Result<u32> {
        Ok(self.create(|m| &mut m.shaders))
    }

    unsafe fn delete_shader(&self, shader: u32) {
        self.delete(shader, |m| &mut m.shaders);
    }

    unsafe fn compile_shader(&self, _shader: u32, _source: &str) -> bool {
        !self.model.borrow().fail_compile
    }

    unsafe fn shader_info_log(&self, _shader: u32) -> String {
        "0:1(1): error: syntax error".to_owned()
    }

    unsafe fn attach_shader(&self, _program: u32, _shader: u32) {}

    unsafe fn detach_shader(&self, _program: u32, _shader: u32) {}

    unsafe fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        self.with(|m| m.attrib_bindings.insert((program, index), name.to_owned()));
    }

    unsafe fn link_program(&self, program: u32) -> bool {
        self.model.borrow().programs.contains(&program)
    }

    unsafe fn program_info_log(&self, _program: u32) -> String {
        String::new()
    }

    unsafe fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        (name == "u_texture" && self.model.borrow().programs.contains(&program)).then_some(0)
    }

    unsafe fn uniform_1_i32(&self, location: u32, value: i32) {
        self.with(|m| m.uniforms.insert(location, value));
    }

    unsafe fn create_vertex_array(&self) -> Result<u32> {
        Ok(self.create(|m| &mut m.vertex_arrays))
    }

    unsafe fn delete_vertex_array(&self, vertex_array: u32) {
        self.delete(vertex_array, |m| &mut m.vertex_arrays);
    }

    unsafe fn create_buffer(&self) -> Result<u32> {
        Ok(self.create(|m| &mut m.buffers))
    }

    unsafe fn delete_buffer(&self, buffer: u32) {
        self.delete(buffer, |m| &mut m.buffers);
    }

    unsafe fn buffer_data(&self, _target: u32, _data: &[u8], _usage: u32) {}

    unsafe fn enable_vertex_attrib_array(&self, _index: u32) {}

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        _index: u32,
        _size: i32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
    }

    unsafe fn draw_arrays(&self, _mode: u32, _first: i32, _count: i32) {
        self.with(|m| {
            m.draw_calls += 1;
            if m.record_draw_state {
                m.last_draw = Some(m.observed());
            }
        });
    }
}

#[derive(Default)]
struct ContextLog {
    switches: Vec<ContextRole>,
    current: Option<ContextRole>,
    fail_next: bool,
}

/// Context switcher that records every switch it is asked for.
#[derive(Clone, Default)]
pub struct FakeContexts {
    log: Arc<Mutex<ContextLog>>,
}

impl FakeContexts {
    /// A switcher whose `role` context is already current.
    pub fn starting_in(role: ContextRole) -> Self {
        let contexts = Self::default();
        contexts.log.lock().current = Some(role);
        contexts
    }

    pub fn current(&self) -> Option<ContextRole> {
        self.log.lock().current
    }

    pub fn switches(&self) -> Vec<ContextRole> {
        self.log.lock().switches.clone()
    }

    /// Make the next switch fail.
    pub fn fail_next(&self) {
        self.log.lock().fail_next = true;
    }
}

impl ContextSwitch for FakeContexts {
    fn make_current(&self, role: ContextRole) -> Result<()> {
        let mut log = self.log.lock();
        if std::mem::take(&mut log.fail_next) {
            log.current = None;
            return Err(Error::gl(format!("could not make the {role:?} context current")));
        }
        log.switches.push(role);
        log.current = Some(role);
        Ok(())
    }

    fn window(&self) -> WindowHandle {
        WINDOW
    }
}

/// A call the adapter made into the windowing library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OsCall {
    SetSizeCallback { installed: bool },
    GetSize,
    CreateCursor(StandardCursor),
    DestroyCursor(CursorHandle),
    SetCursor(Option<CursorHandle>),
    Focus,
}

#[derive(Default)]
struct OsModel {
    size: (i32, i32),
    callback: Option<SizeCallback>,
    calls: Vec<OsCall>,
    next_cursor: u64,
    live_cursors: HashMap<CursorHandle, StandardCursor>,
    installed: Option<CursorHandle>,
    fail_cursors: bool,
}

/// One OS window with a size callback slot and a cursor table.
pub struct FakeWindowSystem {
    model: Mutex<OsModel>,
}

impl FakeWindowSystem {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            model: Mutex::new(OsModel {
                size: (width, height),
                ..OsModel::default()
            }),
        }
    }

    /// Resize the window and run the size callback like the OS thread would.
    pub fn fire_resize(&self, width: i32, height: i32) {
        let callback = {
            let mut model = self.model.lock();
            model.size = (width, height);
            model.callback.take()
        };
        let Some(mut callback) = callback else {
            return;
        };
        callback(WINDOW, width, height);

        let mut model = self.model.lock();
        if model.callback.is_none() {
            model.callback = Some(callback);
        }
    }

    pub fn has_size_callback(&self) -> bool {
        self.model.lock().callback.is_some()
    }

    pub fn calls(&self) -> Vec<OsCall> {
        self.model.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.model.lock().calls.clear();
    }

    pub fn live_cursors(&self) -> usize {
        self.model.lock().live_cursors.len()
    }

    pub fn installed_cursor(&self) -> Option<CursorHandle> {
        self.model.lock().installed
    }

    pub fn installed_shape(&self) -> Option<StandardCursor> {
        let model = self.model.lock();
        model
            .installed
            .and_then(|cursor| model.live_cursors.get(&cursor).copied())
    }

    pub fn fail_cursor_creation(&self) {
        self.model.lock().fail_cursors = true;
    }
}

impl WindowSystem for FakeWindowSystem {
    fn set_size_callback(
        &self,
        _window: WindowHandle,
        callback: Option<SizeCallback>,
    ) -> Option<SizeCallback> {
        let mut model = self.model.lock();
        model.calls.push(OsCall::SetSizeCallback {
            installed: callback.is_some(),
        });
        std::mem::replace(&mut model.callback, callback)
    }

    fn window_size(&self, _window: WindowHandle) -> (i32, i32) {
        let mut model = self.model.lock();
        model.calls.push(OsCall::GetSize);
        model.size
    }

    fn create_standard_cursor(&self, shape: StandardCursor) -> Option<CursorHandle> {
        let mut model = self.model.lock();
        model.calls.push(OsCall::CreateCursor(shape));
        if model.fail_cursors {
            return None;
        }
        model.next_cursor += 1;
        let cursor = CursorHandle(model.next_cursor);
        model.live_cursors.insert(cursor, shape);
        Some(cursor)
    }

    fn destroy_cursor(&self, cursor: CursorHandle) {
        let mut model = self.model.lock();
        model.calls.push(OsCall::DestroyCursor(cursor));
        model.live_cursors.remove(&cursor);
        if model.installed == Some(cursor) {
            model.installed = None;
        }
    }

    fn set_cursor(&self, _window: WindowHandle, cursor: Option<CursorHandle>) {
        let mut model = self.model.lock();
        model.calls.push(OsCall::SetCursor(cursor));
        model.installed = cursor;
    }

    fn focus_window(&self, _window: WindowHandle) {
        self.model.lock().calls.push(OsCall::Focus);
    }
}

/// A toolkit notification as it arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    WindowResize(u32, u32),
    Focus(WindowEventKind),
    Destroy,
    ViewResize(u32, u32),
}

/// Toolkit window and scene graph in one, recording what they are told.
#[derive(Default)]
pub struct Recorder {
    notices: Mutex<Vec<Notice>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl WindowNotifier for Recorder {
    fn notify_resize(&self, _kind: WindowEventKind, width: u32, height: u32) {
        self.notices.lock().push(Notice::WindowResize(width, height));
    }

    fn notify_focus(&self, kind: WindowEventKind) {
        self.notices.lock().push(Notice::Focus(kind));
    }

    fn notify_destroy(&self) {
        self.notices.lock().push(Notice::Destroy);
    }
}

impl SceneNotifier for Recorder {
    fn notify_view_resize(&self, width: u32, height: u32) {
        self.notices.lock().push(Notice::ViewResize(width, height));
    }
}
