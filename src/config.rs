//! Process configuration: environment variables plus an optional TOML file of
//! quiz settings (profile, empty-result policy, generation parameters, prompt).
//!
//! Loaded once at startup, validated, then shared read-only. Any error here is fatal.

use std::{fmt, net::{IpAddr, SocketAddr}, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{EmptyPolicy, QuizProfile};
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str =
  "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Instruction sent to the model. `{topic}` and `{count}` are substituted.
/// The marker layout here is what the extractor recognizes; keep them in sync.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate a quiz with exactly {count} questions about: {topic}
For each question:
- Phrase the question clearly
- Provide 4 distinct options labeled A-D
- Indicate the correct answer with just the letter
Use this exact format:

**QUESTION 1:** [Question text]?
**OPTION A:** [Choice 1]
**OPTION B:** [Choice 2]
**OPTION C:** [Choice 3]
**OPTION D:** [Choice 4]
**ANS:** A

Repeat for the remaining questions up to {count} with the same format.";

/// Sampling parameters forwarded verbatim as the `parameters` object of the request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationParams {
  pub max_new_tokens: u32,
  pub temperature: f32,
  pub top_p: f32,
  pub do_sample: bool,
  pub return_full_text: bool,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct GenerationFile {
  max_new_tokens: Option<u32>,
  temperature: Option<f32>,
  top_p: Option<f32>,
  do_sample: Option<bool>,
  return_full_text: Option<bool>,
}

/// Raw TOML schema; every field optional.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct QuizSettingsFile {
  #[serde(default)] profile: Option<QuizProfile>,
  #[serde(default)] on_empty: Option<EmptyPolicy>,
  #[serde(default)] request_timeout_secs: Option<u64>,
  #[serde(default)] prompt_template: Option<String>,
  #[serde(default)] generation: GenerationFile,
}

/// Resolved quiz settings with all defaults applied.
#[derive(Clone, Debug)]
pub struct QuizSettings {
  pub profile: QuizProfile,
  pub on_empty: EmptyPolicy,
  pub request_timeout: Duration,
  pub prompt_template: String,
  pub generation: GenerationParams,
}

impl Default for QuizSettings {
  fn default() -> Self {
    QuizSettings::resolve(QuizSettingsFile::default())
  }
}

impl QuizSettings {
  fn resolve(file: QuizSettingsFile) -> Self {
    let profile = file.profile.unwrap_or_default();
    let g = file.generation;
    Self {
      profile,
      on_empty: file.on_empty.unwrap_or_default(),
      request_timeout: Duration::from_secs(file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
      prompt_template: file.prompt_template.unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.into()),
      generation: GenerationParams {
        max_new_tokens: g.max_new_tokens.unwrap_or_else(|| profile.default_max_new_tokens()),
        temperature: g.temperature.unwrap_or(0.7),
        top_p: g.top_p.unwrap_or(0.9),
        do_sample: g.do_sample.unwrap_or(true),
        return_full_text: g.return_full_text.unwrap_or(false),
      },
    }
  }

  fn from_toml_str(s: &str, path: &str) -> Result<QuizSettingsFile, ConfigError> {
    toml::from_str::<QuizSettingsFile>(s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
  }
}

/// Everything the service needs to run.
#[derive(Clone)]
pub struct AppConfig {
  pub api_token: String,
  pub api_url: String,
  pub bind_addr: SocketAddr,
  pub quiz: QuizSettings,
}

impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("api_token", &"<redacted>")
      .field("api_url", &self.api_url)
      .field("bind_addr", &self.bind_addr)
      .field("quiz", &self.quiz)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from an arbitrary key lookup (the process env in production).
  pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let api_token = get("HF_API_TOKEN")
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty())
      .ok_or(ConfigError::MissingToken)?;

    let api_url = get("HF_API_URL")
      .filter(|u| !u.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_API_URL.into());

    let ip: IpAddr = match get("BIND_ADDR") {
      Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue { key: "BIND_ADDR", value: v })?,
      None => IpAddr::from([0, 0, 0, 0]),
    };
    let port: u16 = match get("PORT") {
      Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue { key: "PORT", value: v })?,
      None => DEFAULT_PORT,
    };

    let mut file = match get("QUIZ_CONFIG_PATH") {
      Some(path) => {
        let s = std::fs::read_to_string(&path)
          .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let parsed = QuizSettings::from_toml_str(&s, &path)?;
        info!(target: "quizgen", %path, "Loaded quiz config (TOML)");
        parsed
      }
      None => QuizSettingsFile::default(),
    };

    if let Some(v) = get("QUIZ_PROFILE") {
      file.profile = Some(QuizProfile::parse(&v).ok_or(ConfigError::InvalidValue { key: "QUIZ_PROFILE", value: v })?);
    }
    if let Some(v) = get("QUIZ_ON_EMPTY") {
      file.on_empty = Some(EmptyPolicy::parse(&v).ok_or(ConfigError::InvalidValue { key: "QUIZ_ON_EMPTY", value: v })?);
    }
    if file.request_timeout_secs == Some(0) {
      return Err(ConfigError::InvalidValue { key: "request_timeout_secs", value: "0".into() });
    }

    Ok(Self {
      api_token,
      api_url,
      bind_addr: SocketAddr::new(ip, port),
      quiz: QuizSettings::resolve(file),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn missing_or_blank_token_is_fatal() {
    assert!(matches!(AppConfig::from_lookup(lookup(&[])), Err(ConfigError::MissingToken)));
    assert!(matches!(AppConfig::from_lookup(lookup(&[("HF_API_TOKEN", "  ")])), Err(ConfigError::MissingToken)));
  }

  #[test]
  fn defaults_apply_when_only_token_is_set() {
    let cfg = AppConfig::from_lookup(lookup(&[("HF_API_TOKEN", "hf_test")])).expect("config");
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 5000)));
    assert_eq!(cfg.quiz.profile, QuizProfile::Standard);
    assert_eq!(cfg.quiz.on_empty, EmptyPolicy::ReturnEmpty);
    assert_eq!(cfg.quiz.request_timeout, Duration::from_secs(30));
    assert_eq!(cfg.quiz.generation.max_new_tokens, 800);
    assert!(cfg.quiz.generation.do_sample);
    assert!(!cfg.quiz.generation.return_full_text);
  }

  #[test]
  fn env_overrides_profile_and_policy() {
    let cfg = AppConfig::from_lookup(lookup(&[
      ("HF_API_TOKEN", "hf_test"),
      ("QUIZ_PROFILE", "extended"),
      ("QUIZ_ON_EMPTY", "return_fallback"),
      ("PORT", "8080"),
    ]))
    .expect("config");
    assert_eq!(cfg.quiz.profile, QuizProfile::Extended);
    assert_eq!(cfg.quiz.on_empty, EmptyPolicy::ReturnFallback);
    assert_eq!(cfg.quiz.generation.max_new_tokens, 700);
    assert_eq!(cfg.bind_addr.port(), 8080);
  }

  #[test]
  fn invalid_values_are_rejected() {
    let bad_port = AppConfig::from_lookup(lookup(&[("HF_API_TOKEN", "t"), ("PORT", "http")]));
    assert!(matches!(bad_port, Err(ConfigError::InvalidValue { key: "PORT", .. })));
    let bad_profile = AppConfig::from_lookup(lookup(&[("HF_API_TOKEN", "t"), ("QUIZ_PROFILE", "huge")]));
    assert!(matches!(bad_profile, Err(ConfigError::InvalidValue { key: "QUIZ_PROFILE", .. })));
  }

  #[test]
  fn toml_settings_override_defaults() {
    let file = QuizSettings::from_toml_str(
      r#"
        profile = "extended"
        on_empty = "return_fallback"
        request_timeout_secs = 10

        [generation]
        temperature = 0.2
        max_new_tokens = 1024
      "#,
      "quiz.toml",
    )
    .expect("parse");
    let s = QuizSettings::resolve(file);
    assert_eq!(s.profile, QuizProfile::Extended);
    assert_eq!(s.on_empty, EmptyPolicy::ReturnFallback);
    assert_eq!(s.request_timeout, Duration::from_secs(10));
    assert_eq!(s.generation.max_new_tokens, 1024);
    assert_eq!(s.generation.temperature, 0.2);
    assert_eq!(s.generation.top_p, 0.9);
    assert_eq!(s.prompt_template, DEFAULT_PROMPT_TEMPLATE);
  }

  #[test]
  fn unknown_toml_values_fail_to_parse() {
    assert!(matches!(
      QuizSettings::from_toml_str(r#"on_empty = "retry""#, "quiz.toml"),
      Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
      QuizSettings::from_toml_str("verbose = true", "quiz.toml"),
      Err(ConfigError::Parse { .. })
    ));
  }

  #[test]
  fn debug_output_redacts_token() {
    let cfg = AppConfig::from_lookup(lookup(&[("HF_API_TOKEN", "hf_secret_value")])).expect("config");
    let dbg = format!("{:?}", cfg);
    assert!(!dbg.contains("hf_secret_value"));
    assert!(dbg.contains("<redacted>"));
  }
}
