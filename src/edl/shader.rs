use crate::{
    edl::shade::EdlParams,
    shader::{
        FragmentShaderParts, GlslType, ShaderDefines, UniformDecl, defines::glsl_float,
    },
};

const EDL_AUX: &str = "
float getLinearDepth(const in vec2 screenPosition) {
    float fragCoordZ = texture2D(tDepth, screenPosition).x;
    float viewZ = perspectiveDepthToViewZ(fragCoordZ, cameraNear, cameraFar);
    return viewZToOrthographicDepth(viewZ, cameraNear, cameraFar);
}

float shadow(const in vec2 uv, const in float depth) {
    vec2 radius = vec2(1.0) / resolution;
    float sum = 0.0;
    for (int i = 0; i < KERNEL_SIZE; i++) {
        float neighbour = getLinearDepth(uv + radius * kernel[i]);
        sum += max(0.0, depth - neighbour);
    }
    return sum / float(KERNEL_SIZE);
}
";

const EDL_MAIN: &str = "
float depth = getLinearDepth(vUv);
float res = shadow(vUv, depth);
float edl = exp(-EDL_STRENGTH * res * EDL_DEPTH_SCALE);
return vec4(tex.rgb * edl, tex.a);
";

/// The eye-dome lighting fragment program for a kernel of `kernel_size` offsets.
pub fn edl_fragment_parts(kernel_size: usize, params: EdlParams) -> FragmentShaderParts {
    FragmentShaderParts {
        includes: vec!["common".to_string(), "packing".to_string()],
        defines: ShaderDefines::new()
            .with("KERNEL_SIZE", kernel_size)
            .with("EDL_STRENGTH", glsl_float(params.strength))
            .with("EDL_DEPTH_SCALE", glsl_float(params.depth_scale)),
        uniforms: vec![
            UniformDecl::new("resolution", GlslType::Vec2),
            UniformDecl::new("cameraNear", GlslType::Float),
            UniformDecl::new("cameraFar", GlslType::Float),
            UniformDecl::new("tDepth", GlslType::Sampler2D),
            UniformDecl::array("kernel", GlslType::Vec2, "KERNEL_SIZE"),
        ],
        aux_code: EDL_AUX.to_string(),
        main: EDL_MAIN.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edl/shader.rs"]
mod tests;
