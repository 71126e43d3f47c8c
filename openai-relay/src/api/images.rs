//! Image generation, edits and variations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::multipart::MultipartForm;
use crate::operation::Operation;

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    /// `256x256`
    #[serde(rename = "256x256")]
    Small,
    /// `512x512`
    #[serde(rename = "512x512")]
    Medium,
    /// `1024x1024`
    #[serde(rename = "1024x1024")]
    Large,
}

impl ImageSize {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
        }
    }
}

/// How generated images are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// A hosted URL.
    Url,
    /// Base64-encoded image data.
    B64Json,
}

impl ImageFormat {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::B64Json => "b64_json",
        }
    }
}

/// An image file sent as a form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Used to guess the content type, e.g. `otter.png`.
    pub filename: String,
    /// File contents.
    pub data: Bytes,
}

impl ImageFile {
    /// Wraps image bytes.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Image generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// What to draw.
    pub prompt: String,
    /// Image model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Images to generate, 1 to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Output size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    /// How images are returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ImageFormat>,
    /// End-user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ImageRequest {
    /// Creates a request for one image.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the image count.
    #[must_use]
    pub const fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    /// Sets the output size.
    #[must_use]
    pub const fn size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Edit an image following a prompt. Sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    /// Image to edit. Must be a square PNG.
    pub image: ImageFile,
    /// Transparent areas mark where `image` is edited.
    pub mask: Option<ImageFile>,
    /// What the edited image should show.
    pub prompt: String,
    /// Number of images.
    pub n: Option<u32>,
    /// Output size.
    pub size: Option<ImageSize>,
    /// How images are returned.
    pub response_format: Option<ImageFormat>,
    /// End-user id.
    pub user: Option<String>,
}

impl ImageEditRequest {
    /// Creates an edit request.
    #[must_use]
    pub fn new(image: ImageFile, prompt: impl Into<String>) -> Self {
        Self {
            image,
            mask: None,
            prompt: prompt.into(),
            n: None,
            size: None,
            response_format: None,
            user: None,
        }
    }

    fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new().file(
            "image",
            self.image.filename.as_str(),
            self.image.data.clone(),
        );
        if let Some(mask) = &self.mask {
            form = form.file("mask", mask.filename.as_str(), mask.data.clone());
        }
        form.text("prompt", self.prompt.as_str())
            .text_opt("n", self.n)
            .text_opt("size", self.size.map(ImageSize::as_str))
            .text_opt("response_format", self.response_format.map(ImageFormat::as_str))
            .text_opt("user", self.user.as_deref())
    }
}

/// Variations of an existing image. Sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariationRequest {
    /// Source image. Must be a square PNG.
    pub image: ImageFile,
    /// Number of images.
    pub n: Option<u32>,
    /// Output size.
    pub size: Option<ImageSize>,
    /// How images are returned.
    pub response_format: Option<ImageFormat>,
    /// End-user id.
    pub user: Option<String>,
}

impl ImageVariationRequest {
    /// Creates a variation request.
    #[must_use]
    pub const fn new(image: ImageFile) -> Self {
        Self {
            image,
            n: None,
            size: None,
            response_format: None,
            user: None,
        }
    }

    fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .file("image", self.image.filename.as_str(), self.image.data.clone())
            .text_opt("n", self.n)
            .text_opt("size", self.size.map(ImageSize::as_str))
            .text_opt("response_format", self.response_format.map(ImageFormat::as_str))
            .text_opt("user", self.user.as_deref())
    }
}

/// One generated image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Hosted image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base64 image data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    /// Prompt actually used, when rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

impl Client {
    /// Creates images from a prompt.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request))]
    pub async fn create_image(&self, request: &ImageRequest) -> Result<Envelope<ImageData>> {
        self.post_json(Operation::CreateImage, &[], request).await
    }

    /// Creates an edited image.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(image = %request.image.filename))]
    pub async fn create_image_edit(
        &self,
        request: &ImageEditRequest,
    ) -> Result<Envelope<ImageData>> {
        self.post_multipart(Operation::CreateImageEdit, request.to_form())
            .await
    }

    /// Creates variations of an image.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(image = %request.image.filename))]
    pub async fn create_image_variation(
        &self,
        request: &ImageVariationRequest,
    ) -> Result<Envelope<ImageData>> {
        self.post_multipart(Operation::CreateImageVariation, request.to_form())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::multipart::tests::parse;

    #[test]
    fn size_wire_names() {
        let json = serde_json::to_value(ImageRequest::new("a fox").size(ImageSize::Medium)).unwrap();
        assert_eq!(json["size"], "512x512");
        assert_eq!(ImageSize::Large.as_str(), "1024x1024");
    }

    #[test]
    fn edit_form_fields() {
        let mut request = ImageEditRequest::new(ImageFile::new("otter.png", &b"PNG"[..]), "add a hat");
        request.mask = Some(ImageFile::new("mask.png", &b"MASK"[..]));
        request.size = Some(ImageSize::Small);

        let form = request.to_form();
        let parts = parse(&form.encode(), form.boundary());
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["image", "mask", "prompt", "size"]);
        assert_eq!(parts[0].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[3].data, "256x256");
    }

    #[test]
    fn variation_form_skips_unset() {
        let form = ImageVariationRequest::new(ImageFile::new("cat.png", &b"x"[..])).to_form();
        assert_eq!(form.parts().len(), 1);
        assert_eq!(form.parts()[0].filename.as_deref(), Some("cat.png"));
    }
}
