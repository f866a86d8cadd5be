//! Direct3D 12 backend.
//!
//! Every type wraps the matching COM interface from the `windows` crate. The
//! wrappers add no policy of their own: a failed `HRESULT` becomes an
//! [`Error::Api`] naming the entry point, and nothing else is checked here.

mod command;
mod conv;
mod device;
mod instance;
mod pipeline;
mod resource;
mod swap_chain;
mod sync;

use std::ffi::CString;

use windows::Win32::Graphics::Direct3D::Fxc::{D3DCOMPILE_DEBUG, D3DCOMPILE_SKIP_OPTIMIZATION, D3DCompile};
use windows::Win32::Graphics::Direct3D::ID3DBlob;
use windows::Win32::Graphics::Direct3D12::{
    D3D_ROOT_SIGNATURE_VERSION_1, D3D12_ROOT_SIGNATURE_DESC, D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
    D3D12_ROOT_SIGNATURE_FLAG_NONE, D3D12GetDebugInterface, D3D12SerializeRootSignature, ID3D12Debug1,
};
use windows::core::PCSTR;

use crate::hal::{self, RootSignatureDesc, ShaderSource};
use crate::{Error, Result};

pub use command::{Dx12CommandAllocator, Dx12CommandList};
pub use device::{Dx12DiagnosticsCookie, Dx12Device};
pub use instance::{Dx12Adapter, Dx12Instance};
pub use pipeline::{Dx12PipelineState, Dx12RootSignature};
pub use resource::{Dx12DescriptorHeap, Dx12Heap, Dx12Resource};
pub use swap_chain::Dx12SwapChain;
pub use sync::{Dx12Event, Dx12Fence, Dx12Queue};

/// Marker type selecting the Direct3D 12 backend.
#[derive(Debug, Copy, Clone, Default)]
pub struct Dx12;

impl hal::Api for Dx12 {
    type Instance = Dx12Instance;
    type Adapter = Dx12Adapter;
    type Device = Dx12Device;
    type Queue = Dx12Queue;
    type Fence = Dx12Fence;
    type Event = Dx12Event;
    type CommandAllocator = Dx12CommandAllocator;
    type CommandList = Dx12CommandList;
    type DescriptorHeap = Dx12DescriptorHeap;
    type Heap = Dx12Heap;
    type Resource = Dx12Resource;
    type SwapChain = Dx12SwapChain;
    type RootSignature = Dx12RootSignature;
    type PipelineState = Dx12PipelineState;
    type DiagnosticsCookie = Dx12DiagnosticsCookie;

    const NAME: &'static str = "d3d12";

    fn enable_debug_layer(gpu_based_validation: bool) -> Result<()> {
        let mut debug: Option<ID3D12Debug1> = None;
        unsafe { D3D12GetDebugInterface(&mut debug) }.api("D3D12GetDebugInterface", "debug layer unavailable")?;
        let debug = debug.ok_or_else(|| Error::os_handle("D3D12GetDebugInterface", "no debug interface", "null"))?;

        unsafe {
            debug.EnableDebugLayer();
            if gpu_based_validation {
                debug.SetEnableGPUBasedValidation(true);
            }
        }
        log::debug!("ID3D12Debug1 enabled (gpu-based validation: {gpu_based_validation})");
        Ok(())
    }

    fn serialize_root_signature(desc: &RootSignatureDesc) -> Result<Vec<u8>> {
        let flags = if desc.allow_input_assembler_input_layout {
            D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
        } else {
            D3D12_ROOT_SIGNATURE_FLAG_NONE
        };
        let native = D3D12_ROOT_SIGNATURE_DESC {
            Flags: flags,
            ..Default::default()
        };

        let mut blob: Option<ID3DBlob> = None;
        let mut error: Option<ID3DBlob> = None;
        let serialized =
            unsafe { D3D12SerializeRootSignature(&native, D3D_ROOT_SIGNATURE_VERSION_1, &mut blob, Some(&mut error)) };
        if let Err(e) = serialized {
            let detail = error.as_ref().map(blob_to_string).unwrap_or_else(|| e.message());
            return Err(Error::api("D3D12SerializeRootSignature", "failed to serialize root signature", detail));
        }

        blob.as_ref()
            .map(blob_to_bytes)
            .ok_or_else(|| Error::os_handle("D3D12SerializeRootSignature", "no blob returned", "null"))
    }

    fn compile_shader(source: &ShaderSource<'_>, debug: bool) -> std::result::Result<Vec<u8>, String> {
        let name = CString::new(source.name).map_err(|e| e.to_string())?;
        let entry_point = CString::new(source.entry_point).map_err(|e| e.to_string())?;
        let target = CString::new(source.stage.target()).map_err(|e| e.to_string())?;
        let flags = if debug {
            D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
        } else {
            0
        };

        let mut code: Option<ID3DBlob> = None;
        let mut errors: Option<ID3DBlob> = None;
        let compiled = unsafe {
            D3DCompile(
                source.code.as_ptr().cast(),
                source.code.len(),
                PCSTR(name.as_ptr().cast()),
                None,
                None,
                PCSTR(entry_point.as_ptr().cast()),
                PCSTR(target.as_ptr().cast()),
                flags,
                0,
                &mut code,
                Some(&mut errors),
            )
        };

        match (compiled, code) {
            (Ok(()), Some(code)) => Ok(blob_to_bytes(&code)),
            (Ok(()), None) => Err("compiler returned no bytecode".to_string()),
            (Err(e), _) => Err(errors.as_ref().map(blob_to_string).unwrap_or_else(|| e.message())),
        }
    }
}

fn blob_to_bytes(blob: &ID3DBlob) -> Vec<u8> {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }.to_vec()
}

fn blob_to_string(blob: &ID3DBlob) -> String {
    String::from_utf8_lossy(&blob_to_bytes(blob)).trim_end_matches('\0').to_string()
}

/// Converts a failed `windows` call into an [`Error::Api`] at the caller's location.
pub(crate) trait ApiResultExt<T> {
    fn api(self, operation: &'static str, user_message: &str) -> Result<T>;
}

impl<T> ApiResultExt<T> for windows::core::Result<T> {
    #[track_caller]
    fn api(self, operation: &'static str, user_message: &str) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(Error::api(
                operation,
                user_message,
                format!("{} ({})", e.message(), e.code()),
            )),
        }
    }
}
