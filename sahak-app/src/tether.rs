use anyhow::{Context, Result, bail};
use sahak_classify::{PageId, PagePreset, Pipeline, PipelineSettings, Profiler};
use sahak_common::LlmConfig;
use sahak_config::{API_KEY_ENV, SahakConfig};
use sahak_llm::{ensure_llm_ready, traits::LlmClient};
use sahak_web::{SourceOptions, Wikipedia};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, built once from the loaded configuration.
pub struct Tether {
    llm_config: LlmConfig,
    llm: Arc<dyn LlmClient + Send + Sync>,
    page_models: bool,
    source_opts: SourceOptions,
    settings: PipelineSettings,
}

impl Tether {
    pub fn from_config(cfg: &SahakConfig) -> Result<Self> {
        let api_key = match cfg.resolve_api_key() {
            Some(key) => key,
            None => prompt_api_key()?,
        };
        let llm_config = cfg.llm_config(api_key);
        let llm = ensure_llm_ready(&llm_config)?;

        Ok(Self {
            llm_config,
            llm,
            page_models: cfg.llm.page_models,
            source_opts: source_options(cfg),
            settings: pipeline_settings(cfg),
        })
    }

    pub fn pipeline(&self, page: PageId) -> Result<Pipeline> {
        let preset = PagePreset::for_page(page)?;
        let source = preset
            .build_source(&self.source_opts)
            .with_context(|| format!("building the document source for `{page}`"))?;
        let llm = self.llm_for(preset.model)?;
        Ok(Pipeline::new(preset, source, llm, self.settings))
    }

    /// The shared client, or a new one when the page pins another model.
    fn llm_for(&self, pinned: Option<&str>) -> Result<Arc<dyn LlmClient + Send + Sync>> {
        match pinned.filter(|_| self.page_models) {
            Some(model) if Some(model) != self.llm_config.model() => {
                Ok(ensure_llm_ready(&self.llm_config.clone().with_model(model))?)
            }
            _ => Ok(self.llm.clone()),
        }
    }

    pub fn profiler(&self) -> Result<Profiler> {
        let wiki = Wikipedia::with_options(&self.source_opts)?;
        let profiler = Profiler::new(Arc::new(wiki), self.llm.clone());
        Ok(if self.settings.cache_enabled {
            profiler.with_cache(self.settings.cache_ttl)
        } else {
            profiler
        })
    }
}

fn source_options(cfg: &SahakConfig) -> SourceOptions {
    SourceOptions {
        base_url: None,
        timeout: cfg.sources.timeout_secs.map(Duration::from_secs),
        user_agent: cfg.sources.user_agent.clone(),
    }
}

fn pipeline_settings(cfg: &SahakConfig) -> PipelineSettings {
    PipelineSettings {
        cache_enabled: cfg.cache.enabled,
        cache_ttl: cfg.cache.ttl(),
    }
}

/// Last resort for the API key: ask on an interactive terminal.
fn prompt_api_key() -> Result<String> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("no Gemini API key: set llm.api_key in the config file or {API_KEY_ENV}");
    }

    let mut stderr = std::io::stderr();
    write!(stderr, "Gemini API 키를 입력하세요: ")?;
    stderr.flush()?;

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let key = line.trim();
    if key.is_empty() {
        bail!("no Gemini API key entered");
    }
    tracing::debug!("api key read from terminal");
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sahak_config::SahakConfigLoader;

    fn loaded(yaml: &str) -> SahakConfig {
        SahakConfigLoader::new().with_yaml_str(yaml).load().unwrap()
    }

    #[test]
    fn source_overrides_come_from_config() {
        let cfg = loaded("sources:\n  timeout_secs: 9\n  user_agent: \"sahak-test\"\n");
        let opts = source_options(&cfg);
        assert_eq!(opts.timeout, Some(Duration::from_secs(9)));
        assert_eq!(opts.user_agent.as_deref(), Some("sahak-test"));
        assert!(opts.base_url.is_none());
    }

    #[test]
    fn cache_settings_flow_into_the_pipeline() {
        let cfg = loaded("cache:\n  enabled: false\n  ttl_secs: 42\n");
        let settings = pipeline_settings(&cfg);
        assert!(!settings.cache_enabled);
        assert_eq!(settings.cache_ttl, Duration::from_secs(42));
    }

    #[test]
    fn pinned_models_apply_unless_disabled() {
        let yaml = "llm:\n  api_key: \"AIza-test\"\n  endpoint: \"http://127.0.0.1:9\"\n";
        let tether = Tether::from_config(&loaded(yaml)).unwrap();
        assert_eq!(tether.llm_for(None).unwrap().model_name(), "gemini-2.5-flash-lite");
        assert_eq!(
            tether.llm_for(Some("gemini-2.5-flash")).unwrap().model_name(),
            "gemini-2.5-flash"
        );

        let unpinned = format!("{yaml}  page_models: false\n");
        let tether = Tether::from_config(&loaded(&unpinned)).unwrap();
        assert_eq!(
            tether.llm_for(Some("gemini-2.5-flash")).unwrap().model_name(),
            "gemini-2.5-flash-lite"
        );
    }

    #[test]
    fn configured_key_builds_every_page() {
        let cfg = loaded("llm:\n  api_key: \"AIza-test\"\n  endpoint: \"http://127.0.0.1:9\"\n");
        let tether = Tether::from_config(&cfg).unwrap();
        for page in PageId::ALL {
            assert_eq!(tether.pipeline(page).unwrap().page(), page);
        }
        assert!(tether.profiler().is_ok());
    }
}
