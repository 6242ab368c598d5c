use std::fmt;

use bitflags::bitflags;
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::Deserialize as _;
use serde_derive::{Deserialize, Serialize};

/// Source file namespace a registry record was declared in.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum GlFile {
    Gl,
    Wgl,
    Glx,
}

/// The APIs a registry file declares requirement lists for.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum InputApi {
    Gl,
    Gles1,
    Gles2,
    Wgl,
    Glx,
}

/// One resolved API variant of the generated surface.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum OutputApi {
    Gl,
    GlCompat,
    Gles1,
    Gles2,
    Wgl,
    Glx,
}

impl OutputApi {
    /// Every output variant, in canonical emission order.
    pub const ALL: [OutputApi; 6] = [
        OutputApi::Gl,
        OutputApi::GlCompat,
        OutputApi::Gles1,
        OutputApi::Gles2,
        OutputApi::Wgl,
        OutputApi::Glx,
    ];

    /// The specification file family this variant is resolved from.
    pub fn file(self) -> GlFile {
        match self {
            OutputApi::Gl | OutputApi::GlCompat | OutputApi::Gles1 | OutputApi::Gles2 => GlFile::Gl,
            OutputApi::Wgl => GlFile::Wgl,
            OutputApi::Glx => GlFile::Glx,
        }
    }
}

impl fmt::Display for OutputApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputApi::Gl => "GL",
            OutputApi::GlCompat => "GLCompat",
            OutputApi::Gles1 => "GLES1",
            OutputApi::Gles2 => "GLES2",
            OutputApi::Wgl => "WGL",
            OutputApi::Glx => "GLX",
        };
        write!(f, "{name}")
    }
}

/// A `major.minor` API version as written in the requirement lists.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Profile a requirement entry is scoped to.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GlProfile {
    #[default]
    None,
    Core,
    Compatibility,
}

bitflags! {
    /// Per-enumerant applicability bitmask over the output variants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ApiFlags: u8 {
        const GL = 1 << 0;
        const GL_COMPAT = 1 << 1;
        const GLES1 = 1 << 2;
        const GLES2 = 1 << 3;
        const WGL = 1 << 4;
        const GLX = 1 << 5;
    }
}

impl ApiFlags {
    /// The flag bit corresponding to one output variant.
    pub fn for_api(api: OutputApi) -> ApiFlags {
        match api {
            OutputApi::Gl => ApiFlags::GL,
            OutputApi::GlCompat => ApiFlags::GL_COMPAT,
            OutputApi::Gles1 => ApiFlags::GLES1,
            OutputApi::Gles2 => ApiFlags::GLES2,
            OutputApi::Wgl => ApiFlags::WGL,
            OutputApi::Glx => ApiFlags::GLX,
        }
    }
}

// Serialized as the raw bit pattern rather than a list of names.
impl serde::Serialize for ApiFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> serde::Deserialize<'de> for ApiFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        ApiFlags::from_bits(bits)
            .ok_or_else(|| DeError::custom(format!("invalid api flag bits: {bits:#04x}")))
    }
}

/// The closed catalog of spec-level primitive kinds, including every
/// windowing-system specific opaque type named by the WGL and GLX files.
/// `Invalid` is what the parsing collaborator emits for a type it could not
/// classify; mapping it is always an error.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    Invalid,
    Void,
    Byte,
    Sbyte,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Half,
    Float,
    Double,
    Bool8,
    Bool32,
    Char8,
    Enum,
    IntPtr,
    Nint,
    VoidPtr,
    GlHandleArb,
    GlSync,
    ClContext,
    ClEvent,
    GlDebugProc,
    GlDebugProcArb,
    GlDebugProcKhr,
    GlDebugProcAmd,
    GlDebugProcNv,
    GlVulkanProcNv,
    WglProc,
    WglRect,
    WglLpString,
    WglColorRef,
    WglLayerPlaneDescriptor,
    WglPixelFormatDescriptor,
    WglGpuDevice,
    WglPGpuDevice,
    GlxColormap,
    GlxDisplay,
    GlxFont,
    GlxPixmap,
    GlxScreen,
    GlxStatus,
    GlxWindow,
    GlxExtFuncPtr,
    GlxXVisualInfo,
    GlxDmBuffer,
    GlxDmParams,
    GlxVlNode,
    GlxVlPath,
    GlxVlServer,
    GlxFbConfigId,
    GlxFbConfig,
    GlxContextId,
    GlxContext,
    GlxGlxPixmap,
    GlxGlxDrawable,
    GlxGlxWindow,
    GlxGlxPbuffer,
    GlxVideoCaptureDeviceNv,
    GlxVideoDeviceNv,
    GlxVideoSourceSgix,
    GlxFbConfigIdSgix,
    GlxFbConfigSgix,
    GlxGlxPbufferSgix,
    GlxPbufferClobberEvent,
    GlxBufferSwapComplete,
    GlxEvent,
    GlxStereoNotifyEventExt,
    GlxBufferClobberEventSgix,
    GlxHyperpipeNetworkSgix,
    GlxHyperpipeConfigSgix,
    GlxPipeRect,
    GlxPipeRectLimits,
}

/// Spec-level type shape: a pointer chain ending in a base primitive.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum GlType {
    Pointer {
        inner: Box<GlType>,
        constant: bool,
    },
    Base {
        kind: PrimitiveKind,
        constant: bool,
    },
}

/// Typed object handle classes used by the typesafe-handle mapping mode.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum HandleType {
    ProgramHandle,
    ProgramPipelineHandle,
    ShaderHandle,
    BufferHandle,
    TextureHandle,
    QueryHandle,
    FramebufferHandle,
    RenderbufferHandle,
    SamplerHandle,
    TransformFeedbackHandle,
    VertexArrayHandle,
    DisplayListHandle,
}

impl HandleType {
    pub fn name(self) -> &'static str {
        match self {
            HandleType::ProgramHandle => "ProgramHandle",
            HandleType::ProgramPipelineHandle => "ProgramPipelineHandle",
            HandleType::ShaderHandle => "ShaderHandle",
            HandleType::BufferHandle => "BufferHandle",
            HandleType::TextureHandle => "TextureHandle",
            HandleType::QueryHandle => "QueryHandle",
            HandleType::FramebufferHandle => "FramebufferHandle",
            HandleType::RenderbufferHandle => "RenderbufferHandle",
            HandleType::SamplerHandle => "SamplerHandle",
            HandleType::TransformFeedbackHandle => "TransformFeedbackHandle",
            HandleType::VertexArrayHandle => "VertexArrayHandle",
            HandleType::DisplayListHandle => "DisplayListHandle",
        }
    }
}

/// Reference binding a parameter or return type to a named enum group.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct GroupRef {
    pub name: String,
}

/// A spec type together with its optional handle class and group binding.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypeReference {
    #[serde(rename = "type")]
    pub ty: GlType,
    #[serde(default)]
    pub handle: Option<HandleType>,
    #[serde(default)]
    pub group: Option<GroupRef>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FlowDirection {
    In,
    Out,
    #[default]
    Undefined,
}

/// Length relation of a pointer parameter, as declared in the registry.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum LengthRef {
    Fixed(u64),
    Parameter(String),
    Computed(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct GlParameter {
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub name: String,
    #[serde(default)]
    pub flow: FlowDirection,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub length: Option<LengthRef>,
}

/// One raw entry point declaration. Immutable once parsed.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Command {
    pub entry_point: String,
    pub return_type: TypeReference,
    pub parameters: Vec<GlParameter>,
}

/// Membership of an enumerant in one named group, with the file it came from.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct GroupMembership {
    pub name: String,
    pub file: GlFile,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum EnumKind {
    Plain,
    Bitmask,
}

/// One raw enumerant declaration. May belong to several groups and APIs.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumEntry {
    pub name: String,
    pub value: u64,
    #[serde(default)]
    pub groups: Vec<GroupMembership>,
    pub apis: ApiFlags,
    pub kind: EnumKind,
}

/// Extension that requires a command, with its owning vendor.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionReference {
    pub name: String,
    pub vendor: String,
    #[serde(default)]
    pub profile: GlProfile,
}

/// The folded require/remove record for one command under one input API.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionReference {
    pub entry_point: String,
    #[serde(default)]
    pub added_in: Option<Version>,
    #[serde(default)]
    pub removed_in: Option<Version>,
    #[serde(default)]
    pub profile: GlProfile,
    #[serde(default)]
    pub extensions: Vec<ExtensionReference>,
}

/// The folded require/remove record for one enumerant under one input API.
/// There is no extension-relative removal for enumerants in this model.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumReference {
    pub name: String,
    #[serde(default)]
    pub added_in: Option<Version>,
    #[serde(default)]
    pub removed_in: Option<Version>,
    #[serde(default)]
    pub profile: GlProfile,
}

/// Ordered requirement lists for one input API.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ApiRequires {
    pub api: InputApi,
    #[serde(default)]
    pub functions: Vec<FunctionReference>,
    #[serde(default)]
    pub enums: Vec<EnumReference>,
}

/// The full specification record set for one family run.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Registry {
    pub file: GlFile,
    pub commands: Vec<Command>,
    pub enums: Vec<EnumEntry>,
    pub apis: Vec<ApiRequires>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_api_maps_to_owning_file() {
        assert_eq!(OutputApi::Gl.file(), GlFile::Gl);
        assert_eq!(OutputApi::GlCompat.file(), GlFile::Gl);
        assert_eq!(OutputApi::Gles1.file(), GlFile::Gl);
        assert_eq!(OutputApi::Gles2.file(), GlFile::Gl);
        assert_eq!(OutputApi::Wgl.file(), GlFile::Wgl);
        assert_eq!(OutputApi::Glx.file(), GlFile::Glx);
    }

    #[test]
    fn api_flags_roundtrip_as_raw_bits() {
        let flags = ApiFlags::GL | ApiFlags::GLES2;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "9");
        let back: ApiFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn api_flags_reject_unknown_bits() {
        let result: Result<ApiFlags, _> = serde_json::from_str("255");
        assert!(result.is_err());
    }

    #[test]
    fn version_displays_as_major_dot_minor() {
        assert_eq!(Version::new(4, 6).to_string(), "4.6");
        assert_eq!(Version::new(1, 0).to_string(), "1.0");
    }
}
