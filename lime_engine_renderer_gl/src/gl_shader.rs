/// Shader sources and program compilation
///
/// Every program shares the vertex layout of `lime_engine` vertices:
/// position, color, two texture coordinate sets. Attribute locations are
/// bound before linking so vertex setup never queries them.

use glow::HasContext;
use lime_engine::lime::{Error, Result};
use lime_engine::lime::device::ShaderProgram;
use lime_engine::engine_error;

// ===== ATTRIBUTES / UNIFORMS =====

pub const ATTRIB_POSITION: u32 = 0;
pub const ATTRIB_COLOR: u32 = 1;
pub const ATTRIB_UV1: u32 = 2;
pub const ATTRIB_UV2: u32 = 3;

const ATTRIBUTES: [(u32, &str); 4] = [
    (ATTRIB_POSITION, "inPos"),
    (ATTRIB_COLOR, "inColor"),
    (ATTRIB_UV1, "inTexCoords1"),
    (ATTRIB_UV2, "inTexCoords2"),
];

pub const PROJECTION_UNIFORM: &str = "matProjection";

/// Sampler uniforms and the stage each one reads
pub const SAMPLERS: [(&str, i32); 2] = [("tex1", 0), ("tex2", 1)];

// ===== SOURCES =====

const ONE_TEXTURE_VERTEX: &str = "
attribute vec4 inPos;
attribute vec4 inColor;
attribute vec2 inTexCoords1;
varying lowp vec4 color;
varying lowp vec2 texCoords;
uniform mat4 matProjection;
void main()
{
    gl_Position = matProjection * inPos;
    color = inColor;
    texCoords = inTexCoords1;
}
";

const TWO_TEXTURES_VERTEX: &str = "
attribute vec4 inPos;
attribute vec4 inColor;
attribute vec2 inTexCoords1;
attribute vec2 inTexCoords2;
varying lowp vec4 color;
varying lowp vec2 texCoords1;
varying lowp vec2 texCoords2;
uniform mat4 matProjection;
void main()
{
    gl_Position = matProjection * inPos;
    color = inColor;
    texCoords1 = inTexCoords1;
    texCoords2 = inTexCoords2;
}
";

const COLOR_ONLY_FRAGMENT: &str = "
varying lowp vec4 color;
void main()
{
    gl_FragColor = color;
}
";

const ONE_TEXTURE_FRAGMENT: &str = "
varying lowp vec4 color;
varying lowp vec2 texCoords;
uniform lowp sampler2D tex1;
void main()
{
    gl_FragColor = color * texture2D(tex1, texCoords);
}
";

const TWO_TEXTURES_FRAGMENT: &str = "
varying lowp vec4 color;
varying lowp vec2 texCoords1;
varying lowp vec2 texCoords2;
uniform lowp sampler2D tex1;
uniform lowp sampler2D tex2;
void main()
{
    gl_FragColor = color * texture2D(tex1, texCoords1) * texture2D(tex2, texCoords2);
}
";

const SILHOUETTE_FRAGMENT: &str = "
varying lowp vec4 color;
varying lowp vec2 texCoords;
uniform lowp sampler2D tex1;
void main()
{
    lowp float a = texture2D(tex1, texCoords).a;
    gl_FragColor = color * vec4(a, a, a, a);
}
";

const TWO_TEXTURES_SILHOUETTE_FRAGMENT: &str = "
varying lowp vec4 color;
varying lowp vec2 texCoords1;
varying lowp vec2 texCoords2;
uniform lowp sampler2D tex1;
uniform lowp sampler2D tex2;
void main()
{
    lowp float a2 = texture2D(tex2, texCoords2).a;
    gl_FragColor = texture2D(tex1, texCoords1) * color * vec4(a2, a2, a2, a2);
}
";

const INVERSED_SILHOUETTE_FRAGMENT: &str = "
varying lowp vec4 color;
varying lowp vec2 texCoords;
uniform lowp sampler2D tex1;
void main()
{
    lowp float a = 1.0 - texture2D(tex1, texCoords).a;
    gl_FragColor = color * vec4(a, a, a, a);
}
";

/// Fragment shaders on GLES need a default float precision
const FRAGMENT_PRELUDE: &str = "#ifdef GL_ES\nprecision mediump float;\n#endif\n";

/// Vertex and fragment source bodies of `program`, without version header
pub fn program_sources(program: ShaderProgram) -> (&'static str, &'static str) {
    match program {
        ShaderProgram::ColorOnly => (ONE_TEXTURE_VERTEX, COLOR_ONLY_FRAGMENT),
        ShaderProgram::OneTexture => (ONE_TEXTURE_VERTEX, ONE_TEXTURE_FRAGMENT),
        ShaderProgram::TwoTextures => (TWO_TEXTURES_VERTEX, TWO_TEXTURES_FRAGMENT),
        ShaderProgram::Silhouette => (ONE_TEXTURE_VERTEX, SILHOUETTE_FRAGMENT),
        ShaderProgram::TwoTexturesSilhouette => (TWO_TEXTURES_VERTEX, TWO_TEXTURES_SILHOUETTE_FRAGMENT),
        ShaderProgram::InversedSilhouette => (ONE_TEXTURE_VERTEX, INVERSED_SILHOUETTE_FRAGMENT),
    }
}

/// Complete vertex and fragment sources for `program` under `header`
pub fn full_sources(header: &str, program: ShaderProgram) -> (String, String) {
    let (vertex, fragment) = program_sources(program);
    (
        format!("{}{}", header, vertex),
        format!("{}{}{}", header, FRAGMENT_PRELUDE, fragment),
    )
}

// ===== COMPILATION =====

/// Linked program plus the uniform the device updates
pub struct GlProgram {
    pub program: glow::Program,
    pub projection: Option<glow::UniformLocation>,
    /// Projection revision last uploaded to this program
    pub projection_revision: u64,
}

unsafe fn compile_shader(gl: &glow::Context, stage: u32, source: &str, name: &str) -> Result<glow::Shader> {
    let shader = gl.create_shader(stage).map_err(|e| {
        engine_error!("lime::gl", "Failed to create {} shader: {}", name, e);
        Error::ShaderCompilation(format!("{}: {}", name, e))
    })?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        engine_error!("lime::gl", "Shader {} failed to compile: {}", name, log);
        return Err(Error::ShaderCompilation(format!("{}: {}", name, log)));
    }
    Ok(shader)
}

/// Compile and link `program`, binding attribute locations and sampler stages
///
/// Any compile or link failure is returned as `ShaderCompilation` with the
/// driver's info log.
pub fn compile_program(gl: &glow::Context, header: &str, program: ShaderProgram) -> Result<GlProgram> {
    let (vertex_source, fragment_source) = full_sources(header, program);
    let name = format!("{:?}", program);
    unsafe {
        let vertex = compile_shader(gl, glow::VERTEX_SHADER, &vertex_source, &format!("{} (vertex)", name))?;
        let fragment = match compile_shader(gl, glow::FRAGMENT_SHADER, &fragment_source, &format!("{} (fragment)", name)) {
            Ok(fragment) => fragment,
            Err(error) => {
                gl.delete_shader(vertex);
                return Err(error);
            }
        };

        let handle = match gl.create_program() {
            Ok(handle) => handle,
            Err(e) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                engine_error!("lime::gl", "Failed to create program {}: {}", name, e);
                return Err(Error::ShaderCompilation(format!("{}: {}", name, e)));
            }
        };
        gl.attach_shader(handle, vertex);
        gl.attach_shader(handle, fragment);
        for (location, attribute) in ATTRIBUTES {
            gl.bind_attrib_location(handle, location, attribute);
        }
        gl.link_program(handle);
        let linked = gl.get_program_link_status(handle);
        gl.detach_shader(handle, vertex);
        gl.detach_shader(handle, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        if !linked {
            let log = gl.get_program_info_log(handle);
            gl.delete_program(handle);
            engine_error!("lime::gl", "Program {} failed to link: {}", name, log);
            return Err(Error::ShaderCompilation(format!("{}: {}", name, log)));
        }

        gl.use_program(Some(handle));
        for (sampler, stage) in SAMPLERS {
            if let Some(location) = gl.get_uniform_location(handle, sampler) {
                gl.uniform_1_i32(Some(&location), stage);
            }
        }
        let projection = gl.get_uniform_location(handle, PROJECTION_UNIFORM);
        gl.use_program(None);

        Ok(GlProgram { program: handle, projection, projection_revision: 0 })
    }
}
