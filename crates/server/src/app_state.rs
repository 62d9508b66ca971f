use std::sync::Arc;

use crate::{config::Settings, provider::CompletionProvider};

/// Model parameters applied to every completion request.
#[derive(Debug, Clone)]
pub(crate) struct GenerationSettings {
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
}

impl From<&Settings> for GenerationSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.gemini_model.clone(),
            temperature: settings.gemini_temperature,
            max_tokens: settings.gemini_max_tokens,
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) provider: Arc<dyn CompletionProvider>,
    pub(crate) generation: GenerationSettings,
}
