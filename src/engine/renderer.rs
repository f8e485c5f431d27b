use wasm_bindgen::prelude::*;
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlShader, WebGlTexture, WebGlUniformLocation};
use nalgebra::{Matrix3, Matrix4, Point3};

use crate::engine::mesh::{Mesh, Primitive, FLOATS_PER_VERTEX};
use crate::engine::texture::TextureData;
use crate::scene::graph::Lights;

const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    attribute vec3 aNormal;
    attribute vec3 aColor;
    attribute vec2 aTexCoord;
    uniform mat4 uModel;
    uniform mat3 uNormalMatrix;
    uniform mat4 uViewProjection;
    uniform float uPointSize;
    varying vec3 vColor;
    varying vec2 vTexCoord;
    varying vec3 vWorldPos;
    varying vec3 vNormal;
    void main() {
        vec4 world = uModel * vec4(aPosition, 1.0);
        vWorldPos = world.xyz;
        vNormal = uNormalMatrix * aNormal;
        vColor = aColor;
        vTexCoord = aTexCoord;
        gl_PointSize = uPointSize;
        gl_Position = uViewProjection * world;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    varying vec3 vColor;
    varying vec2 vTexCoord;
    varying vec3 vWorldPos;
    varying vec3 vNormal;
    uniform sampler2D uTexture;
    uniform bool uUseTexture;
    uniform bool uUseVertexColor;
    uniform bool uRoundPoints;
    uniform bool uLit;
    uniform vec3 uColor;
    uniform float uOpacity;
    uniform vec3 uAmbient;
    uniform vec3 uLightPosition;
    uniform vec3 uLightColor;
    uniform vec3 uCameraPosition;

    void main() {
        if (uRoundPoints) {
            vec2 c = gl_PointCoord - vec2(0.5);
            if (dot(c, c) > 0.25) {
                discard;
            }
        }

        vec3 color = uUseVertexColor ? vColor : uColor;
        if (uUseTexture) {
            color *= texture2D(uTexture, vTexCoord).rgb;
        }

        if (uLit) {
            vec3 n = normalize(vNormal);
            if (!gl_FrontFacing) {
                n = -n;
            }
            vec3 l = normalize(uLightPosition - vWorldPos);
            vec3 v = normalize(uCameraPosition - vWorldPos);
            vec3 h = normalize(l + v);
            float diffuse = max(dot(n, l), 0.0);
            float specular = pow(max(dot(n, h), 0.0), 30.0) * 0.07;
            color = color * (uAmbient + uLightColor * diffuse) + uLightColor * specular;
        }

        gl_FragColor = vec4(color, uOpacity);
    }
"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Unlit flat color, used for the sun, orbit rings and particles.
    Basic,
    /// Ambient plus point-light diffuse and specular.
    Phong,
}

pub struct Material<'a> {
    pub color: (f32, f32, f32),
    pub shading: Shading,
    pub texture: Option<&'a WebGlTexture>,
    pub vertex_colors: bool,
    pub opacity: f32,
    pub double_sided: bool,
    pub point_size: f32,
}

impl<'a> Material<'a> {
    pub fn basic(color: (f32, f32, f32)) -> Self {
        Material {
            color,
            shading: Shading::Basic,
            texture: None,
            vertex_colors: false,
            opacity: 1.0,
            double_sided: false,
            point_size: 1.0,
        }
    }

    pub fn phong(color: (f32, f32, f32)) -> Self {
        Material { shading: Shading::Phong, ..Material::basic(color) }
    }

    /// Per-vertex colored round points.
    pub fn points(size: f32, opacity: f32) -> Self {
        Material { vertex_colors: true, point_size: size, opacity, ..Material::basic((1.0, 1.0, 1.0)) }
    }

    pub fn with_texture(mut self, texture: Option<&'a WebGlTexture>) -> Self {
        self.texture = texture;
        self
    }

    pub fn transparent(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

/// Mesh data resident on the GPU.
pub struct GpuMesh {
    vertex_buffer: WebGlBuffer,
    index_buffer: Option<WebGlBuffer>,
    count: i32,
    primitive: Primitive,
}

/// Camera state shared by every draw in one frame.
pub struct FrameCamera {
    pub view_projection: Matrix4<f32>,
    pub eye: Point3<f32>,
}

struct Attributes {
    position: i32,
    normal: i32,
    color: i32,
    tex_coord: i32,
}

struct Uniforms {
    model: WebGlUniformLocation,
    normal_matrix: WebGlUniformLocation,
    view_projection: WebGlUniformLocation,
    point_size: WebGlUniformLocation,
    use_texture: WebGlUniformLocation,
    use_vertex_color: WebGlUniformLocation,
    round_points: WebGlUniformLocation,
    lit: WebGlUniformLocation,
    color: WebGlUniformLocation,
    opacity: WebGlUniformLocation,
    ambient: WebGlUniformLocation,
    light_position: WebGlUniformLocation,
    light_color: WebGlUniformLocation,
    camera_position: WebGlUniformLocation,
}

pub struct Renderer {
    gl: WebGlRenderingContext,
    attributes: Attributes,
    uniforms: Uniforms,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let attributes = Attributes {
            position: gl.get_attrib_location(&program, "aPosition"),
            normal: gl.get_attrib_location(&program, "aNormal"),
            color: gl.get_attrib_location(&program, "aColor"),
            tex_coord: gl.get_attrib_location(&program, "aTexCoord"),
        };

        let uniform = |name: &str| {
            gl.get_uniform_location(&program, name)
                .ok_or_else(|| JsValue::from_str(&format!("Failed to get {} location", name)))
        };
        let uniforms = Uniforms {
            model: uniform("uModel")?,
            normal_matrix: uniform("uNormalMatrix")?,
            view_projection: uniform("uViewProjection")?,
            point_size: uniform("uPointSize")?,
            use_texture: uniform("uUseTexture")?,
            use_vertex_color: uniform("uUseVertexColor")?,
            round_points: uniform("uRoundPoints")?,
            lit: uniform("uLit")?,
            color: uniform("uColor")?,
            opacity: uniform("uOpacity")?,
            ambient: uniform("uAmbient")?,
            light_position: uniform("uLightPosition")?,
            light_color: uniform("uLightColor")?,
            camera_position: uniform("uCameraPosition")?,
        };

        gl.enable(WebGlRenderingContext::DEPTH_TEST);
        gl.enable(WebGlRenderingContext::CULL_FACE);
        gl.blend_func(WebGlRenderingContext::SRC_ALPHA, WebGlRenderingContext::ONE_MINUS_SRC_ALPHA);

        Ok(Renderer { gl, attributes, uniforms })
    }

    pub fn clear(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    /// Blending on and depth writes off, so translucent geometry does not
    /// hide what is drawn after it.
    pub fn begin_transparent(&self) {
        self.gl.enable(WebGlRenderingContext::BLEND);
        self.gl.depth_mask(false);
    }

    pub fn end_transparent(&self) {
        self.gl.depth_mask(true);
        self.gl.disable(WebGlRenderingContext::BLEND);
    }

    pub fn set_lights(&self, lights: &Lights) {
        let (ar, ag, ab) = lights.ambient;
        let (lr, lg, lb) = lights.point_color;
        let k = lights.point_intensity;
        let p = lights.point_position;
        self.gl.uniform3f(Some(&self.uniforms.ambient), ar, ag, ab);
        self.gl.uniform3f(Some(&self.uniforms.light_color), lr * k, lg * k, lb * k);
        self.gl.uniform3f(Some(&self.uniforms.light_position), p.x, p.y, p.z);
    }

    pub fn set_camera(&self, camera: &FrameCamera) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.uniforms.view_projection), false, camera.view_projection.as_slice());
        self.gl.uniform3f(Some(&self.uniforms.camera_position), camera.eye.x, camera.eye.y, camera.eye.z);
    }

    pub fn upload(&self, mesh: &Mesh) -> Result<GpuMesh, JsValue> {
        let vertex_buffer = self.gl.create_buffer().ok_or("Failed to create vertex buffer")?;
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(&mesh.vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }

        let (index_buffer, count) = if mesh.indices.is_empty() {
            (None, mesh.vertex_count() as i32)
        } else {
            let index_buffer = self.gl.create_buffer().ok_or("Failed to create index buffer")?;
            self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
            unsafe {
                let idx_array = js_sys::Uint16Array::view(&mesh.indices);
                self.gl.buffer_data_with_array_buffer_view(
                    WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
                    &idx_array,
                    WebGlRenderingContext::STATIC_DRAW
                );
            }
            (Some(index_buffer), mesh.indices.len() as i32)
        };

        Ok(GpuMesh { vertex_buffer, index_buffer, count, primitive: mesh.primitive })
    }

    pub fn upload_texture(&self, data: &TextureData) -> Result<WebGlTexture, JsValue> {
        let texture = self.gl.create_texture().ok_or("Failed to create texture")?;
        self.gl.bind_texture(WebGlRenderingContext::TEXTURE_2D, Some(&texture));
        self.gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            WebGlRenderingContext::TEXTURE_2D,
            0,
            WebGlRenderingContext::RGBA as i32,
            data.width as i32,
            data.height as i32,
            0,
            WebGlRenderingContext::RGBA,
            WebGlRenderingContext::UNSIGNED_BYTE,
            Some(data.pixels.as_slice()),
        )?;

        if is_power_of_2(data.width) && is_power_of_2(data.height) {
            self.gl.generate_mipmap(WebGlRenderingContext::TEXTURE_2D);
            self.gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_MIN_FILTER, WebGlRenderingContext::LINEAR_MIPMAP_LINEAR as i32);
        } else {
            self.gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_WRAP_S, WebGlRenderingContext::CLAMP_TO_EDGE as i32);
            self.gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_WRAP_T, WebGlRenderingContext::CLAMP_TO_EDGE as i32);
            self.gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_MIN_FILTER, WebGlRenderingContext::LINEAR as i32);
        }

        Ok(texture)
    }

    pub fn draw(&self, mesh: &GpuMesh, material: &Material, model: &Matrix4<f32>) {
        let gl = &self.gl;

        match material.texture {
            Some(texture) => {
                gl.active_texture(WebGlRenderingContext::TEXTURE0);
                gl.bind_texture(WebGlRenderingContext::TEXTURE_2D, Some(texture));
                gl.uniform1i(Some(&self.uniforms.use_texture), 1);
            }
            None => gl.uniform1i(Some(&self.uniforms.use_texture), 0),
        }
        let (r, g, b) = material.color;
        gl.uniform3f(Some(&self.uniforms.color), r, g, b);
        gl.uniform1i(Some(&self.uniforms.use_vertex_color), material.vertex_colors as i32);
        gl.uniform1i(Some(&self.uniforms.lit), (material.shading == Shading::Phong) as i32);
        gl.uniform1i(Some(&self.uniforms.round_points), (mesh.primitive == Primitive::Points) as i32);
        gl.uniform1f(Some(&self.uniforms.opacity), material.opacity);
        gl.uniform1f(Some(&self.uniforms.point_size), material.point_size);

        if material.double_sided {
            gl.disable(WebGlRenderingContext::CULL_FACE);
        } else {
            gl.enable(WebGlRenderingContext::CULL_FACE);
        }

        gl.uniform_matrix4fv_with_f32_array(Some(&self.uniforms.model), false, model.as_slice());
        let normal_matrix = normal_matrix(model);
        gl.uniform_matrix3fv_with_f32_array(Some(&self.uniforms.normal_matrix), false, normal_matrix.as_slice());

        gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&mesh.vertex_buffer));
        let stride = (FLOATS_PER_VERTEX * 4) as i32;
        let attributes = [
            (self.attributes.position, 3, 0),
            (self.attributes.normal, 3, 12),
            (self.attributes.color, 3, 24),
            (self.attributes.tex_coord, 2, 36),
        ];
        for (location, size, offset) in attributes {
            // The GLSL compiler drops attributes it can prove unused.
            if location < 0 {
                continue;
            }
            gl.vertex_attrib_pointer_with_i32(location as u32, size, WebGlRenderingContext::FLOAT, false, stride, offset);
            gl.enable_vertex_attrib_array(location as u32);
        }

        let mode = match mesh.primitive {
            Primitive::Triangles => WebGlRenderingContext::TRIANGLES,
            Primitive::Points => WebGlRenderingContext::POINTS,
        };
        match &mesh.index_buffer {
            Some(index_buffer) => {
                gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
                gl.draw_elements_with_i32(mode, mesh.count, WebGlRenderingContext::UNSIGNED_SHORT, 0);
            }
            None => gl.draw_arrays(mode, 0, mesh.count),
        }
    }
}

/// Inverse transpose of the upper 3x3, so scaled models keep unit-length
/// normals after renormalisation in the shader.
fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
    upper.try_inverse().map(|m| m.transpose()).unwrap_or(upper)
}

fn is_power_of_2(value: u32) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(JsValue::from_str(&gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn compile_shader(gl: &WebGlRenderingContext, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl.create_shader(shader_type).ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(JsValue::from_str(&gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn power_of_two_check() {
        assert!(is_power_of_2(256));
        assert!(is_power_of_2(1));
        assert!(!is_power_of_2(0));
        assert!(!is_power_of_2(384));
    }

    #[test]
    fn normal_matrix_undoes_uniform_scale() {
        let model = Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)) * Matrix4::new_scaling(4.0);
        let n = normal_matrix(&model) * Vector3::y();
        assert!((n.normalize() - Vector3::y()).norm() < 1e-6);
        assert!((n.norm() - 0.25).abs() < 1e-6);
    }
}
