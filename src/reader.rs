//! The reader: options, results and the `read` / `read_image` entry points.

use std::sync::Arc;

use crate::codec::{FilteredMeshDecoder, MeshDecoder};
use crate::extensions::{
    DracoMeshCompression, ExtensionRegistry, ExtensionState, ExtensionType, MeshoptCompression,
};
use crate::glb;
use crate::json::reader::{read_document, EventSource, ReadContext};
use crate::model::{DecodedImage, Model};
use crate::passes;
use crate::texture::{self, Ktx2TranscodeTargets, Ktx2Transcoder};

/// Reader configuration.
///
/// Lives on the reader instance and applies to every subsequent read.
/// Mutation is not synchronized; concurrent reads from several threads are
/// fine as long as nothing mutates the options meanwhile.
pub struct GltfReaderOptions {
    /// Capture properties outside an entity's schema into its
    /// `unknown_properties` map instead of dropping them.
    pub capture_unknown_properties: bool,
    /// Decode `data:` URIs on buffers and images.
    pub resolve_data_uris: bool,
    /// Decode images whose payload is available in-document.
    pub decode_embedded_images: bool,
    /// Run the KHR_draco_mesh_compression decompression pass.
    pub decode_draco: bool,
    /// Run the EXT_meshopt_compression decompression pass.
    pub decode_meshopt: bool,
    /// Fold the CESIUM_RTC center into the scene roots. Off by default so
    /// the parsed extension stays observable on the document.
    pub apply_rtc_center: bool,
    /// Target formats for transcoded KTX2 payloads.
    pub ktx2_transcode_targets: Ktx2TranscodeTargets,
    registry: ExtensionRegistry,
    mesh_decoder: Option<Arc<dyn MeshDecoder>>,
    filtered_mesh_decoder: Option<Arc<dyn FilteredMeshDecoder>>,
    ktx2_transcoder: Option<Arc<dyn Ktx2Transcoder>>,
}

impl Default for GltfReaderOptions {
    fn default() -> Self {
        Self {
            capture_unknown_properties: true,
            resolve_data_uris: true,
            decode_embedded_images: true,
            decode_draco: true,
            decode_meshopt: true,
            apply_rtc_center: false,
            ktx2_transcode_targets: Ktx2TranscodeTargets::default(),
            registry: ExtensionRegistry::default(),
            mesh_decoder: None,
            filtered_mesh_decoder: None,
            ktx2_transcoder: None,
        }
    }
}

impl GltfReaderOptions {
    /// Override how one extension name is handled on subsequent reads.
    pub fn set_extension_state(&mut self, name: impl Into<String>, state: ExtensionState) {
        self.registry.set_state(name, state);
    }

    /// The explicit per-name override, if any.
    pub fn extension_state(&self, name: &str) -> Option<ExtensionState> {
        self.registry.state(name)
    }

    #[inline]
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Install the external codec for KHR_draco_mesh_compression payloads.
    pub fn set_mesh_decoder(&mut self, decoder: Arc<dyn MeshDecoder>) {
        self.mesh_decoder = Some(decoder);
    }

    /// Install the external codec for EXT_meshopt_compression payloads.
    pub fn set_filtered_mesh_decoder(&mut self, decoder: Arc<dyn FilteredMeshDecoder>) {
        self.filtered_mesh_decoder = Some(decoder);
    }

    /// Install the external transcoder for Basis Universal KTX2 payloads.
    pub fn set_ktx2_transcoder(&mut self, transcoder: Arc<dyn Ktx2Transcoder>) {
        self.ktx2_transcoder = Some(transcoder);
    }
}

/// Outcome of reading a document.
///
/// `model` is present iff the envelope and top-level JSON parsed; later
/// passes only ever add to `errors` and `warnings`.
#[derive(Default)]
pub struct GltfReaderResult {
    pub model: Option<Model>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of decoding a standalone image payload.
#[derive(Default)]
pub struct ImageReaderResult {
    pub image: Option<DecodedImage>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Reads glTF documents from byte spans.
///
/// A reader holds options and the extension registry. One instance can
/// serve concurrent reads from multiple threads; mutating options between
/// reads requires exclusive access.
#[derive(Default)]
pub struct GltfReader {
    options: GltfReaderOptions,
}

impl GltfReader {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn options(&self) -> &GltfReaderOptions {
        &self.options
    }

    #[inline]
    pub fn options_mut(&mut self) -> &mut GltfReaderOptions {
        &mut self.options
    }

    /// Read a document from either textual JSON or a GLB envelope.
    ///
    /// The envelope kind is detected from the first four bytes. Fatal
    /// envelope or JSON errors leave `model` unset; everything else is
    /// reported through the result lists on a partial document.
    pub fn read(&self, data: &[u8]) -> GltfReaderResult {
        tracing::debug!(len = data.len(), "reading glTF document");
        let mut result = GltfReaderResult::default();

        let (json, bin) = if glb::is_glb(data) {
            match glb::parse_glb(data) {
                Ok(envelope) => (envelope.json, envelope.bin),
                Err(e) => {
                    result.errors.push(e.to_string());
                    return result;
                }
            }
        } else {
            (data, None)
        };

        let mut src = EventSource::new(json);
        let mut cx = ReadContext::new(
            &self.options.registry,
            self.options.capture_unknown_properties,
        );
        let mut model: Model = match read_document(&mut src, &mut cx) {
            Ok(model) => model,
            Err(e) => {
                result.warnings.append(&mut cx.warnings);
                result.errors.append(&mut cx.errors);
                result.errors.push(e.to_string());
                return result;
            }
        };
        result.warnings.append(&mut cx.warnings);
        result.errors.append(&mut cx.errors);

        // Bind the binary chunk to the first buffer. A declared URI wins;
        // the chunk is then reported as unused.
        if let Some(bin) = bin {
            match model.buffers.first_mut() {
                Some(buffer) if buffer.uri.is_none() => {
                    if buffer.byte_length as usize > bin.len() {
                        result.warnings.push(format!(
                            "/buffers/0: declares {} bytes but the binary chunk holds {}",
                            buffer.byte_length,
                            bin.len()
                        ));
                    }
                    buffer.data = bin.to_vec();
                }
                Some(_) => result
                    .warnings
                    .push("binary chunk is unused: the first buffer declares a URI".to_string()),
                None => result
                    .warnings
                    .push("binary chunk is unused: the document declares no buffers".to_string()),
            }
        }

        for name in &model.extensions_required {
            if !self.options.registry.has_builtin(name) {
                result.warnings.push(format!(
                    "required extension '{name}' has no registered handler"
                ));
            }
        }

        if self.options.resolve_data_uris {
            passes::resolve_data_uris(&mut model, &mut result.errors);
        }
        if self.options.decode_embedded_images {
            passes::decode_images(
                &mut model,
                &self.options.ktx2_transcode_targets,
                self.options.ktx2_transcoder.as_deref(),
                &mut result.errors,
            );
        }
        if self.options.decode_draco
            && !self.options.registry.is_disabled(DracoMeshCompression::NAME)
        {
            passes::decode_draco(
                &mut model,
                self.options.mesh_decoder.as_deref(),
                &mut result.warnings,
                &mut result.errors,
            );
        }
        if self.options.decode_meshopt
            && !self.options.registry.is_disabled(MeshoptCompression::NAME)
        {
            passes::decode_meshopt(
                &mut model,
                self.options.filtered_mesh_decoder.as_deref(),
                &mut result.warnings,
                &mut result.errors,
            );
        }
        if self.options.apply_rtc_center {
            passes::apply_rtc_center(&mut model, &mut result.warnings);
        }

        tracing::debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "document read complete"
        );
        result.model = Some(model);
        result
    }

    /// Decode a standalone image payload; no surrounding document needed.
    ///
    /// Routing is by magic bytes only. Basis Universal payloads need a
    /// transcoder and are reported as errors here; use a reader with a
    /// registered transcoder for those.
    pub fn read_image(data: &[u8], targets: &Ktx2TranscodeTargets) -> ImageReaderResult {
        let mut result = ImageReaderResult::default();
        match texture::decode_image(data, None, targets, None) {
            Ok(image) => result.image = Some(image),
            Err(e) => result.errors.push(e.to_string()),
        }
        result
    }
}
