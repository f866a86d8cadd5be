use std::path::Path;

use crate::hal::{Api, ShaderBlob, ShaderSource, ShaderStage};
use crate::{Error, Result};

/// Compiles HLSL source with the backend's compiler.
///
/// With `debug` the shader keeps debug info and skips optimisation.
pub fn compile_shader<A: Api>(source: &ShaderSource<'_>, debug: bool) -> Result<ShaderBlob> {
    let bytes = A::compile_shader(source, debug).map_err(|diagnostic| Error::ShaderCompilation {
        name: format!("{}:{}", source.name, source.entry_point),
        diagnostic,
    })?;

    log::debug!(
        "compiled {} ({}, {}): {} bytes",
        source.name,
        source.entry_point,
        source.stage.target(),
        bytes.len()
    );
    Ok(ShaderBlob {
        stage: source.stage,
        bytes,
    })
}

/// Reads `path` and compiles `entry_point` from it.
pub fn compile_shader_file<A: Api>(
    path: impl AsRef<Path>,
    entry_point: &str,
    stage: ShaderStage,
    debug: bool,
) -> Result<ShaderBlob> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let code = std::fs::read_to_string(path).map_err(|e| Error::ShaderCompilation {
        name: name.clone(),
        diagnostic: format!("failed to read shader file: {e}"),
    })?;

    compile_shader::<A>(
        &ShaderSource {
            name: &name,
            code: &code,
            entry_point,
            stage,
        },
        debug,
    )
}
