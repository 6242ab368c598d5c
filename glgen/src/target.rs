use glgen_registry::{GlType, GroupRef, HandleType, PrimitiveKind, TypeReference};

use crate::config::GeneratorConfig;
use crate::error::{ProcessError, ProcessResult};

/// Primitive kinds of the emission target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPrimitive {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    IntPtr,
    UIntPtr,
    Bool8,
    Bool32,
    Char8,
    Char16,
}

/// How a pointer parameter is surfaced by the by-reference overload rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Ref,
    In,
    Out,
}

/// Target type-descriptor tree. The first block of variants is produced by
/// the spec type mapping; `String`, `Span` and `Ref` only ever appear in
/// generated overload signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Void,
    Primitive {
        kind: TargetPrimitive,
        constant: bool,
    },
    Pointer {
        inner: Box<TargetType>,
        constant: bool,
    },
    /// Opaque handle emitted as a named struct wrapping one primitive.
    StructWrapped {
        name: String,
        underlying: TargetPrimitive,
        constant: bool,
    },
    Struct {
        name: String,
        constant: bool,
    },
    /// Value restricted to the members of one enum group.
    Enum {
        group: String,
        underlying: TargetPrimitive,
        constant: bool,
    },
    FunctionPointer {
        name: String,
        constant: bool,
    },
    String,
    Span {
        element: Box<TargetType>,
        readonly: bool,
    },
    Ref {
        kind: RefKind,
        element: Box<TargetType>,
    },
}

impl TargetType {
    pub fn is_const(&self) -> bool {
        match self {
            TargetType::Primitive { constant, .. }
            | TargetType::Pointer { constant, .. }
            | TargetType::StructWrapped { constant, .. }
            | TargetType::Struct { constant, .. }
            | TargetType::Enum { constant, .. }
            | TargetType::FunctionPointer { constant, .. } => *constant,
            TargetType::Void | TargetType::String | TargetType::Span { .. } | TargetType::Ref { .. } => {
                false
            }
        }
    }
}

fn struct_wrapped(name: &str, underlying: TargetPrimitive, constant: bool) -> TargetType {
    TargetType::StructWrapped {
        name: name.to_string(),
        underlying,
        constant,
    }
}

fn named_struct(name: &str, constant: bool) -> TargetType {
    TargetType::Struct {
        name: name.to_string(),
        constant,
    }
}

fn function_pointer(name: &str, constant: bool) -> TargetType {
    TargetType::FunctionPointer {
        name: name.to_string(),
        constant,
    }
}

fn primitive(kind: TargetPrimitive, constant: bool) -> TargetType {
    TargetType::Primitive { kind, constant }
}

/// Maps one spec type reference onto the target type tree.
pub fn target_type(reference: &TypeReference, config: &GeneratorConfig) -> ProcessResult<TargetType> {
    map_type(
        &reference.ty,
        reference.handle,
        reference.group.as_ref(),
        config,
    )
}

fn map_type(
    ty: &GlType,
    handle: Option<HandleType>,
    group: Option<&GroupRef>,
    config: &GeneratorConfig,
) -> ProcessResult<TargetType> {
    match ty {
        GlType::Pointer { inner, constant } => Ok(TargetType::Pointer {
            inner: Box::new(map_type(inner, handle, group, config)?),
            constant: *constant,
        }),
        GlType::Base { kind, constant } => map_base(*kind, *constant, handle, group, config),
    }
}

fn map_base(
    kind: PrimitiveKind,
    constant: bool,
    handle: Option<HandleType>,
    group: Option<&GroupRef>,
    config: &GeneratorConfig,
) -> ProcessResult<TargetType> {
    if let Some(handle) = handle {
        if config.typesafe_handles {
            return Ok(struct_wrapped(handle.name(), TargetPrimitive::I32, constant));
        }
        // Handles collapse to plain i32 for source compatibility with the
        // previous generation of the bindings.
        return Ok(primitive(TargetPrimitive::I32, constant));
    }

    // Only 32-bit integer kinds are substituted by their bound group.
    if let Some(group) = group {
        match kind {
            PrimitiveKind::Int => {
                return Ok(TargetType::Enum {
                    group: group.name.clone(),
                    underlying: TargetPrimitive::I32,
                    constant,
                });
            }
            PrimitiveKind::Uint => {
                return Ok(TargetType::Enum {
                    group: group.name.clone(),
                    underlying: TargetPrimitive::U32,
                    constant,
                });
            }
            _ => {}
        }
    }

    use TargetPrimitive as P;
    let mapped = match kind {
        PrimitiveKind::Invalid => return Err(ProcessError::UnmappableType { kind }),

        PrimitiveKind::Void => TargetType::Void,
        PrimitiveKind::Byte => primitive(P::U8, constant),
        PrimitiveKind::Sbyte => primitive(P::I8, constant),
        PrimitiveKind::Short => primitive(P::I16, constant),
        PrimitiveKind::Ushort => primitive(P::U16, constant),
        PrimitiveKind::Int => primitive(P::I32, constant),
        PrimitiveKind::Uint => primitive(P::U32, constant),
        PrimitiveKind::Long => primitive(P::I64, constant),
        PrimitiveKind::Ulong => primitive(P::U64, constant),
        PrimitiveKind::Half => struct_wrapped("Half", P::U16, constant),
        PrimitiveKind::Float => primitive(P::F32, constant),
        PrimitiveKind::Double => primitive(P::F64, constant),

        PrimitiveKind::Bool8 => primitive(P::Bool8, constant),
        PrimitiveKind::Bool32 => primitive(P::Bool32, constant),
        PrimitiveKind::Char8 => primitive(P::Char8, constant),

        // A bare enum type with no group binds to the synthetic All group.
        PrimitiveKind::Enum => TargetType::Enum {
            group: group.map_or_else(|| "All".to_string(), |g| g.name.clone()),
            underlying: P::U32,
            constant,
        },

        PrimitiveKind::IntPtr | PrimitiveKind::Nint => primitive(P::IntPtr, constant),
        PrimitiveKind::VoidPtr => TargetType::Pointer {
            inner: Box::new(TargetType::Void),
            constant,
        },

        PrimitiveKind::GlHandleArb => struct_wrapped("GLHandleARB", P::IntPtr, constant),
        PrimitiveKind::GlSync => struct_wrapped("GLSync", P::IntPtr, constant),
        PrimitiveKind::ClContext => struct_wrapped("CLContext", P::IntPtr, constant),
        PrimitiveKind::ClEvent => struct_wrapped("CLEvent", P::IntPtr, constant),

        PrimitiveKind::GlDebugProc => function_pointer("GLDebugProc", constant),
        PrimitiveKind::GlDebugProcArb => function_pointer("GLDebugProcARB", constant),
        PrimitiveKind::GlDebugProcKhr => function_pointer("GLDebugProcKHR", constant),
        PrimitiveKind::GlDebugProcAmd => function_pointer("GLDebugProcAMD", constant),
        PrimitiveKind::GlDebugProcNv => function_pointer("GLDebugProcNV", constant),
        PrimitiveKind::GlVulkanProcNv => function_pointer("GLVulkanProcNV", constant),

        PrimitiveKind::WglProc => function_pointer("Proc", constant),
        PrimitiveKind::WglRect => named_struct("Rect", constant),
        PrimitiveKind::WglLpString => TargetType::Pointer {
            inner: Box::new(primitive(P::Char16, true)),
            constant,
        },
        PrimitiveKind::WglColorRef => struct_wrapped("ColorRef", P::U32, constant),
        PrimitiveKind::WglLayerPlaneDescriptor => named_struct("LayerPlaneDescriptor", constant),
        PrimitiveKind::WglPixelFormatDescriptor => named_struct("PixelFormatDescriptor", constant),
        PrimitiveKind::WglGpuDevice => named_struct("_GPU_DEVICE", constant),
        PrimitiveKind::WglPGpuDevice => TargetType::Pointer {
            inner: Box::new(named_struct("_GPU_DEVICE", false)),
            constant,
        },

        PrimitiveKind::GlxColormap => struct_wrapped("Colormap", P::UIntPtr, constant),
        PrimitiveKind::GlxDisplay => named_struct("Display", constant),
        PrimitiveKind::GlxFont => struct_wrapped("Font", P::UIntPtr, constant),
        PrimitiveKind::GlxPixmap => struct_wrapped("Pixmap", P::UIntPtr, constant),
        PrimitiveKind::GlxScreen => named_struct("Screen", constant),
        PrimitiveKind::GlxStatus => primitive(P::I32, constant),
        PrimitiveKind::GlxWindow => struct_wrapped("Window", P::UIntPtr, constant),
        PrimitiveKind::GlxExtFuncPtr => function_pointer("__GLXextFuncPtr", constant),
        PrimitiveKind::GlxXVisualInfo => named_struct("XVisualInfo", constant),

        // Conditionally compiled out of the GLX header when the dmedia and
        // video-library headers are absent.
        PrimitiveKind::GlxDmBuffer
        | PrimitiveKind::GlxDmParams
        | PrimitiveKind::GlxVlNode
        | PrimitiveKind::GlxVlPath
        | PrimitiveKind::GlxVlServer => TargetType::Void,

        PrimitiveKind::GlxFbConfigId => struct_wrapped("FBConfigID", P::UIntPtr, constant),
        PrimitiveKind::GlxFbConfig => struct_wrapped("GLXFBConfig", P::IntPtr, constant),
        PrimitiveKind::GlxContextId => struct_wrapped("GLXContextID", P::UIntPtr, constant),
        PrimitiveKind::GlxContext => struct_wrapped("GLXContext", P::IntPtr, constant),
        PrimitiveKind::GlxGlxPixmap => struct_wrapped("GLXPixmap", P::UIntPtr, constant),
        PrimitiveKind::GlxGlxDrawable => struct_wrapped("GLXDrawable", P::UIntPtr, constant),
        PrimitiveKind::GlxGlxWindow => struct_wrapped("GLXWindow", P::UIntPtr, constant),
        PrimitiveKind::GlxGlxPbuffer => struct_wrapped("GLXPbuffer", P::UIntPtr, constant),
        PrimitiveKind::GlxVideoCaptureDeviceNv => {
            struct_wrapped("GLXVideoCaptureDeviceNV", P::UIntPtr, constant)
        }
        PrimitiveKind::GlxVideoDeviceNv => struct_wrapped("GLXVideoDeviceNV", P::U32, constant),
        PrimitiveKind::GlxVideoSourceSgix => {
            struct_wrapped("GLXVideoSourceSGIX", P::UIntPtr, constant)
        }
        PrimitiveKind::GlxFbConfigIdSgix => {
            struct_wrapped("GLXFBConfigIDSGIX", P::UIntPtr, constant)
        }
        PrimitiveKind::GlxFbConfigSgix => struct_wrapped("GLXFBConfigSGIX", P::IntPtr, constant),
        PrimitiveKind::GlxGlxPbufferSgix => struct_wrapped("GLXPbufferSGIX", P::UIntPtr, constant),
        PrimitiveKind::GlxPbufferClobberEvent => named_struct("GLXPbufferClobberEvent", constant),
        PrimitiveKind::GlxBufferSwapComplete => named_struct("GLXBufferSwapComplete", constant),
        PrimitiveKind::GlxEvent => named_struct("GLXEvent", constant),
        PrimitiveKind::GlxStereoNotifyEventExt => {
            named_struct("GLXStereoNotifyEventEXT", constant)
        }
        PrimitiveKind::GlxBufferClobberEventSgix => {
            named_struct("GLXBufferClobberEventSGIX", constant)
        }
        PrimitiveKind::GlxHyperpipeNetworkSgix => {
            named_struct("GLXHyperpipeNetworkSGIX", constant)
        }
        PrimitiveKind::GlxHyperpipeConfigSgix => named_struct("GLXHyperpipeConfigSGIX", constant),
        PrimitiveKind::GlxPipeRect => named_struct("GLXPipeRect", constant),
        PrimitiveKind::GlxPipeRectLimits => named_struct("GLXPipeRectLimits", constant),
    };

    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(kind: PrimitiveKind) -> TypeReference {
        TypeReference {
            ty: GlType::Base {
                kind,
                constant: false,
            },
            handle: None,
            group: None,
        }
    }

    #[test]
    fn pointers_recurse_and_wrap() {
        let config = GeneratorConfig::opengl();
        let reference = TypeReference {
            ty: GlType::Pointer {
                inner: Box::new(GlType::Base {
                    kind: PrimitiveKind::Float,
                    constant: true,
                }),
                constant: false,
            },
            handle: None,
            group: None,
        };
        let mapped = target_type(&reference, &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::Pointer {
                inner: Box::new(TargetType::Primitive {
                    kind: TargetPrimitive::F32,
                    constant: true,
                }),
                constant: false,
            }
        );
    }

    #[test]
    fn typesafe_handles_become_wrapper_structs() {
        let mut config = GeneratorConfig::opengl();
        config.typesafe_handles = true;
        let mut reference = base(PrimitiveKind::Uint);
        reference.handle = Some(HandleType::BufferHandle);
        let mapped = target_type(&reference, &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::StructWrapped {
                name: "BufferHandle".to_string(),
                underlying: TargetPrimitive::I32,
                constant: false,
            }
        );
    }

    #[test]
    fn handles_collapse_to_i32_without_typesafe_mode() {
        let config = GeneratorConfig::opengl();
        let mut reference = base(PrimitiveKind::Uint);
        reference.handle = Some(HandleType::TextureHandle);
        let mapped = target_type(&reference, &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::Primitive {
                kind: TargetPrimitive::I32,
                constant: false,
            }
        );
    }

    #[test]
    fn group_bound_ints_become_enums_with_matching_signedness() {
        let config = GeneratorConfig::opengl();
        for (kind, underlying) in [
            (PrimitiveKind::Int, TargetPrimitive::I32),
            (PrimitiveKind::Uint, TargetPrimitive::U32),
        ] {
            let mut reference = base(kind);
            reference.group = Some(GroupRef {
                name: "TextureTarget".to_string(),
            });
            let mapped = target_type(&reference, &config).unwrap();
            assert_eq!(
                mapped,
                TargetType::Enum {
                    group: "TextureTarget".to_string(),
                    underlying,
                    constant: false,
                }
            );
        }
    }

    #[test]
    fn group_bound_non_int_falls_through_to_catalog() {
        let config = GeneratorConfig::opengl();
        let mut reference = base(PrimitiveKind::Ulong);
        reference.group = Some(GroupRef {
            name: "Whatever".to_string(),
        });
        let mapped = target_type(&reference, &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::Primitive {
                kind: TargetPrimitive::U64,
                constant: false,
            }
        );
    }

    #[test]
    fn bare_enum_kind_binds_to_all_group() {
        let config = GeneratorConfig::opengl();
        let mapped = target_type(&base(PrimitiveKind::Enum), &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::Enum {
                group: "All".to_string(),
                underlying: TargetPrimitive::U32,
                constant: false,
            }
        );
    }

    #[test]
    fn windowing_handles_wrap_pointer_sized_ints() {
        let config = GeneratorConfig::glx();
        let mapped = target_type(&base(PrimitiveKind::GlxGlxDrawable), &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::StructWrapped {
                name: "GLXDrawable".to_string(),
                underlying: TargetPrimitive::UIntPtr,
                constant: false,
            }
        );
        let mapped = target_type(&base(PrimitiveKind::GlxContext), &config).unwrap();
        assert_eq!(
            mapped,
            TargetType::StructWrapped {
                name: "GLXContext".to_string(),
                underlying: TargetPrimitive::IntPtr,
                constant: false,
            }
        );
    }

    #[test]
    fn invalid_kind_is_a_fatal_error() {
        let config = GeneratorConfig::opengl();
        let result = target_type(&base(PrimitiveKind::Invalid), &config);
        assert_eq!(
            result,
            Err(ProcessError::UnmappableType {
                kind: PrimitiveKind::Invalid
            })
        );
    }
}
