//! Azure OpenAI implementations of the AI capabilities.
//!
//! One client implements all three traits: extraction and style derivation
//! go through the chat-completions deployment with base64 data-URI image
//! parts; illustrations go through the image-generations deployment.
//!
//! ## Two image-endpoint shapes
//!
//! Image deployments come in two URL dialects: classic Azure resource
//! endpoints (`https://{resource}.openai.azure.com`, addressed per
//! deployment with an `api-version` query and an `api-key` header), and
//! serverless model endpoints (`https://{name}.models.ai.azure.com`, which
//! speak the plain OpenAI-compatible `/v1` surface with a bearer token).
//! The dialect is decided once from the endpoint pattern at construction
//! time ([`ImageEndpoint`]), not re-inspected per call.
//!
//! Every provider failure is translated into the closed [`AiError`]
//! classification at this boundary; HTTP 400 rejection messages run
//! through [`AiError::classify_rejection`] so content-policy blocks reach
//! the fallback ladder as [`AiError::ContentBlocked`].

use crate::ai::{Illustrator, IllustrationRequest, RecipeExtractor, StyleDeriver};
use crate::error::{AiError, CookbookError};
use crate::pipeline::encode::ImageData;
use crate::prompts;
use crate::recipe::Recipe;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Credentials and deployment names for Azure OpenAI.
///
/// Plain data — constructing it performs no I/O and no network calls.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub chat_deployment: String,
    /// Image endpoint; defaults to `endpoint` when the deployment lives on
    /// the same resource.
    pub image_endpoint: String,
    pub image_api_key: String,
    pub image_deployment: String,
}

impl AzureConfig {
    /// Read the configuration from `AZURE_OPENAI_*` environment variables.
    ///
    /// `AZURE_OPENAI_IMAGE_ENDPOINT` / `AZURE_OPENAI_IMAGE_API_KEY` fall
    /// back to the chat endpoint and key when unset.
    pub fn from_env() -> Result<Self, CookbookError> {
        fn required(name: &str) -> Result<String, CookbookError> {
            std::env::var(name).ok().filter(|v| !v.is_empty()).ok_or_else(|| {
                CookbookError::InvalidConfig(format!(
                    "Missing required environment variable: {name}"
                ))
            })
        }

        let endpoint = required("AZURE_OPENAI_ENDPOINT")?;
        let api_key = required("AZURE_OPENAI_API_KEY")?;
        Ok(AzureConfig {
            image_endpoint: std::env::var("AZURE_OPENAI_IMAGE_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| endpoint.clone()),
            image_api_key: std::env::var("AZURE_OPENAI_IMAGE_API_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| api_key.clone()),
            endpoint,
            api_key,
            api_version: required("AZURE_OPENAI_API_VERSION")?,
            chat_deployment: required("AZURE_OPENAI_CHAT_DEPLOYMENT")?,
            image_deployment: required("AZURE_OPENAI_IMAGE_DEPLOYMENT")?,
        })
    }
}

/// The image-generation URL dialect, decided at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageEndpoint {
    /// Classic Azure resource: per-deployment path + `api-version` query +
    /// `api-key` header.
    AzureDeployment,
    /// Serverless model endpoint: OpenAI-compatible `/v1` path + bearer token.
    OpenAiCompatible,
}

impl ImageEndpoint {
    fn detect(endpoint: &str) -> ImageEndpoint {
        if endpoint.contains(".models.ai.azure.com") {
            ImageEndpoint::OpenAiCompatible
        } else {
            ImageEndpoint::AzureDeployment
        }
    }
}

/// Azure OpenAI client implementing all three AI capabilities.
pub struct AzureOpenAiClient {
    config: AzureConfig,
    image_endpoint: ImageEndpoint,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    pub fn new(config: AzureConfig) -> Self {
        let image_endpoint = ImageEndpoint::detect(&config.image_endpoint);
        debug!("image endpoint dialect: {:?}", image_endpoint);
        AzureOpenAiClient {
            config,
            image_endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.chat_deployment,
            self.config.api_version
        )
    }

    fn image_url(&self) -> String {
        let base = self.config.image_endpoint.trim_end_matches('/');
        match self.image_endpoint {
            ImageEndpoint::AzureDeployment => format!(
                "{base}/openai/deployments/{}/images/generations?api-version={}",
                self.config.image_deployment, self.config.api_version
            ),
            ImageEndpoint::OpenAiCompatible => format!("{base}/v1/images/generations"),
        }
    }

    /// POST a chat request and return the first choice's message content.
    async fn chat(&self, body: serde_json::Value) -> Result<ChatMessageContent, AiError> {
        let response = self
            .client
            .post(self.chat_url())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        let response = check_status(response).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| AiError::EmptyResponse("chat response had no choices".into()))
    }

    /// Build a chat user-content array: one text part followed by the
    /// images as data-URI parts, order preserved.
    fn user_content(text: &str, images: &[ImageData]) -> serde_json::Value {
        let mut parts = vec![json!({ "type": "text", "text": text })];
        for image in images {
            parts.push(json!({
                "type": "image_url",
                "image_url": { "url": image.to_data_uri() }
            }));
        }
        serde_json::Value::Array(parts)
    }
}

#[async_trait]
impl RecipeExtractor for AzureOpenAiClient {
    async fn extract(&self, crops: &[ImageData], language: &str) -> Result<Recipe, AiError> {
        let body = json!({
            "messages": [
                { "role": "system", "content": prompts::EXTRACTION_SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_content(
                    &format!(
                        "{}\nRespond with a single JSON object with exactly these keys: \
                         dish_name, description, ingredients, cooking_steps, \
                         preparation_time, cooking_time, servings, tips. \
                         ingredients, cooking_steps and tips are arrays of strings.",
                        prompts::extraction_prompt(language)
                    ),
                    crops,
                ) },
            ],
            "response_format": { "type": "json_object" },
        });

        let message = self.chat(body).await?;
        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AiError::EmptyResponse("extraction returned no content".into()))?;

        let recipe: Recipe = serde_json::from_str(&content)
            .map_err(|e| AiError::MalformedResponse(format!("recipe JSON: {e}")))?;
        if recipe.dish_name.trim().is_empty() {
            return Err(AiError::EmptyResponse(
                "extraction returned a recipe without a dish name".into(),
            ));
        }
        Ok(recipe)
    }
}

#[async_trait]
impl StyleDeriver for AzureOpenAiClient {
    async fn derive_style(&self, references: &[ImageData]) -> Result<String, AiError> {
        let body = json!({
            "messages": [
                { "role": "user", "content": Self::user_content(
                    prompts::STYLE_DERIVATION_PROMPT,
                    references,
                ) },
            ],
        });

        let message = self.chat(body).await?;
        let style = message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AiError::EmptyResponse("style derivation returned no content".into()))?;
        Ok(style)
    }
}

#[async_trait]
impl Illustrator for AzureOpenAiClient {
    async fn generate(&self, request: &IllustrationRequest) -> Result<Vec<u8>, AiError> {
        // The generations surface is prompt-only; the conditioning images in
        // the request are used by edit-capable deployments, which neither
        // dialect here exposes yet.
        let body = json!({
            "prompt": request.prompt,
            "n": 1,
            "size": "1024x1024",
            "response_format": "b64_json",
        });

        let builder = self.client.post(self.image_url());
        let builder = match self.image_endpoint {
            ImageEndpoint::AzureDeployment => {
                builder.header("api-key", &self.config.image_api_key)
            }
            ImageEndpoint::OpenAiCompatible => {
                builder.bearer_auth(&self.config.image_api_key)
            }
        };

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;
        let b64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| AiError::EmptyResponse("image generation returned no data".into()))?;
        STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| AiError::MalformedResponse(format!("image base64: {e}")))
    }
}

/// Map a non-success HTTP response to the closed [`AiError`] set.
///
/// 400 bodies carry provider rejection messages and run through
/// [`AiError::classify_rejection`]; 401/403 are authentication failures.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.map(|e| e.message))
        .unwrap_or(body);

    match status.as_u16() {
        400 => Err(AiError::classify_rejection(message)),
        401 | 403 => Err(AiError::Auth(message)),
        _ => Err(AiError::Api(format!("HTTP {status}: {message}"))),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Debug, Deserialize)]
struct ChatMessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageGenerationDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationDatum {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
}
