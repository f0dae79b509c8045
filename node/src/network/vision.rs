// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Dominant-color extraction through an image-analysis service.
//!
//! [`VisionExtractor`] speaks the Google Cloud Vision `images:annotate`
//! protocol with the `IMAGE_PROPERTIES` feature and keeps the dominant color
//! with the highest score.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tinta_kernel::types::Rgb;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image service returned status {0}")]
    Status(u16),

    #[error("Image service error: {0}")]
    Api(String),

    #[error("No dominant color in response")]
    NoColor,
}

#[async_trait]
pub trait ColorExtractor: Send + Sync + 'static {
    async fn dominant_color(&self, photo_url: &str) -> Result<Rgb, ExtractError>;
}

#[derive(Debug, Clone)]
pub struct VisionExtractor {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl VisionExtractor {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ColorExtractor for VisionExtractor {
    async fn dominant_color(&self, photo_url: &str) -> Result<Rgb, ExtractError> {
        let url = format!("{}/v1/images:annotate", self.base_url);
        let body = AnnotateRequest::image_properties(normalize_photo_url(photo_url));

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.query(&[("key", key)]);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ExtractError::Status(resp.status().as_u16()));
        }

        let parsed: AnnotateResponse = resp.json().await?;
        pick_dominant(parsed)
    }
}

/// Catalog photos are often protocol-relative (`//host/path`).
pub fn normalize_photo_url(url: &str) -> String {
    let url = url.trim();
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

pub fn pick_dominant(resp: AnnotateResponse) -> Result<Rgb, ExtractError> {
    let first = resp.responses.into_iter().next().ok_or(ExtractError::NoColor)?;
    if let Some(err) = first.error {
        return Err(ExtractError::Api(err.message));
    }

    first
        .image_properties_annotation
        .and_then(|a| a.dominant_colors)
        .map(|d| d.colors)
        .unwrap_or_default()
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|c| c.color.to_rgb())
        .ok_or(ExtractError::NoColor)
}

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<ImageRequest>,
}

impl AnnotateRequest {
    pub fn image_properties(image_uri: String) -> Self {
        Self {
            requests: vec![ImageRequest {
                image: Image { source: ImageSource { image_uri } },
                features: vec![Feature { kind: "IMAGE_PROPERTIES".to_string(), max_results: 1 }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageRequest {
    pub image: Image,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Image {
    pub source: ImageSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    #[serde(default)]
    pub image_properties_annotation: Option<ImageProperties>,
    #[serde(default)]
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(default)]
    pub dominant_colors: Option<DominantColors>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DominantColors {
    #[serde(default)]
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorInfo {
    #[serde(default)]
    pub color: ApiColor,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub pixel_fraction: f64,
}

/// Channels are floats in `[0, 255]`; zero channels are omitted on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct ApiColor {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
}

impl ApiColor {
    pub fn to_rgb(&self) -> Rgb {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(self.red), channel(self.green), channel(self.blue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_relative_urls() {
        assert_eq!(normalize_photo_url("//image1.example.com/a.jpg"), "https://image1.example.com/a.jpg");
        assert_eq!(normalize_photo_url("http://x/a.jpg"), "http://x/a.jpg");
    }

    #[test]
    fn test_pick_highest_score() {
        let json = r#"{"responses":[{"imagePropertiesAnnotation":{"dominantColors":{"colors":[
            {"color":{"red":10,"green":20},"score":0.2,"pixelFraction":0.5},
            {"color":{"red":255,"green":70.4,"blue":243},"score":0.7,"pixelFraction":0.1}
        ]}}}]}"#;
        let resp: AnnotateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(pick_dominant(resp).unwrap(), Rgb::new(0xFF, 0x46, 0xF3));
    }

    #[test]
    fn test_api_error_and_empty() {
        let resp: AnnotateResponse =
            serde_json::from_str(r#"{"responses":[{"error":{"code":7,"message":"denied"}}]}"#).unwrap();
        assert!(matches!(pick_dominant(resp), Err(ExtractError::Api(m)) if m == "denied"));

        let resp: AnnotateResponse = serde_json::from_str(r#"{"responses":[{}]}"#).unwrap();
        assert!(matches!(pick_dominant(resp), Err(ExtractError::NoColor)));

        assert!(matches!(pick_dominant(AnnotateResponse::default()), Err(ExtractError::NoColor)));
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(AnnotateRequest::image_properties("https://x/a.jpg".into())).unwrap();
        assert_eq!(body["requests"][0]["image"]["source"]["imageUri"], "https://x/a.jpg");
        assert_eq!(body["requests"][0]["features"][0]["type"], "IMAGE_PROPERTIES");
        assert_eq!(body["requests"][0]["features"][0]["maxResults"], 1);
    }
}
