//! COEIROINK provider implementation

use super::config::CoeiroinkConfig;
use crate::{
    AudioClip, Speaker, SpeakerStyle, SpeechRequest, TTSError, TTSModelsProvider, TTSResult,
    TTSSpeechProvider,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const PROVIDER_NAME: &str = "coeiroink";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStyle {
    style_name: String,
    style_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSpeaker {
    speaker_name: String,
    speaker_uuid: String,
    styles: Vec<WireStyle>,
}

impl From<WireSpeaker> for Speaker {
    fn from(wire: WireSpeaker) -> Self {
        Speaker {
            name: wire.speaker_name,
            speaker_uuid: wire.speaker_uuid,
            styles: wire
                .styles
                .into_iter()
                .map(|s| SpeakerStyle {
                    name: s.style_name,
                    id: s.style_id,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisBody<'a> {
    speaker_uuid: &'a str,
    style_id: i64,
    text: &'a str,
    speed_scale: f32,
    volume_scale: f32,
    pitch_scale: f32,
    intonation_scale: f32,
    pre_phoneme_length: f32,
    post_phoneme_length: f32,
    output_sampling_rate: u32,
    prosody_detail: Vec<serde_json::Value>,
}

/// COEIROINK engine client
pub struct CoeiroinkProvider {
    client: reqwest::Client,
    config: CoeiroinkConfig,
    speakers: RwLock<Option<Arc<Vec<Speaker>>>>,
}

impl CoeiroinkProvider {
    pub fn new(config: CoeiroinkConfig) -> TTSResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            speakers: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &CoeiroinkConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Speaker list, fetched once and cached after the first success
    async fn speakers(&self) -> TTSResult<Arc<Vec<Speaker>>> {
        if let Some(cached) = self.speakers.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let response = self.client.get(self.url("/v1/speakers")).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(TTSError::ProviderError(
                format!("Failed to fetch speakers: {}: {}", status, body),
                PROVIDER_NAME.to_string(),
            ));
        }

        let wire: Vec<WireSpeaker> = response.json().await?;
        let speakers = Arc::new(wire.into_iter().map(Speaker::from).collect::<Vec<_>>());
        log::debug!("Loaded {} COEIROINK speakers", speakers.len());
        *self.speakers.write().await = Some(speakers.clone());
        Ok(speakers)
    }

    fn resolve<'a>(speakers: &'a [Speaker], request: &SpeechRequest) -> TTSResult<&'a Speaker> {
        let uuid = &request.voice.speaker_uuid;
        let speaker = speakers
            .iter()
            .find(|s| &s.speaker_uuid == uuid)
            .ok_or_else(|| {
                TTSError::VoiceNotFound(
                    uuid.clone(),
                    speakers
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })?;

        if speaker.style_index(request.voice.style_id).is_none() {
            return Err(TTSError::VoiceNotFound(
                format!("{} style {}", speaker.name, request.voice.style_id),
                speaker
                    .styles
                    .iter()
                    .map(|s| format!("{} ({})", s.name, s.id))
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }
        Ok(speaker)
    }
}

#[async_trait]
impl TTSSpeechProvider for CoeiroinkProvider {
    async fn synthesize(&self, request: SpeechRequest) -> TTSResult<Option<AudioClip>> {
        let speakers = self.speakers().await?;
        let speaker = Self::resolve(&speakers, &request)?;

        let body = SynthesisBody {
            speaker_uuid: &speaker.speaker_uuid,
            style_id: request.voice.style_id,
            text: &request.text,
            speed_scale: self.config.speed_scale,
            volume_scale: self.config.volume_scale,
            pitch_scale: self.config.pitch_scale,
            intonation_scale: self.config.intonation_scale,
            pre_phoneme_length: self.config.pre_phoneme_length,
            post_phoneme_length: self.config.post_phoneme_length,
            output_sampling_rate: self.config.output_sampling_rate,
            prosody_detail: Vec::new(),
        };

        let response = self
            .client
            .post(self.url("/v1/synthesis"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(TTSError::ProviderError(
                format!("Synthesis failed: {}: {}", status, body),
                PROVIDER_NAME.to_string(),
            ));
        }

        let data = response.bytes().await?;
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(AudioClip::wav(data)))
    }
}

#[async_trait]
impl TTSModelsProvider for CoeiroinkProvider {
    async fn list_speakers(&self) -> TTSResult<Vec<Speaker>> {
        Ok(self.speakers().await?.as_ref().clone())
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }
}
