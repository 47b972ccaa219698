//! Configuração do runbook carregada a partir de `runbook.toml`.
//!
//! A struct [`RunbookConfig`] contém os parâmetros do runner e a lista de
//! ações declaradas em tabelas `[[action]]`. Valores não presentes no
//! arquivo usam defaults sensíveis; se o arquivo não existir, a configuração
//! inteira é o default (nenhuma ação registrada).

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Configuração de nível superior carregada de `runbook.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunbookConfig {
    /// Interrompe a sequência no primeiro passo que falhar.
    #[serde(default)]
    pub abort_on_failure: bool,

    /// Timeout em milissegundos para ações sem timeout próprio. Zero desativa.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Atraso pós-passo em milissegundos quando o passo não declara um.
    #[serde(default)]
    pub default_delay_ms: u64,

    /// Ações de comando de shell registradas pela aplicação.
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionConfig>,
}

/// Uma tabela `[[action]]`: um comando de shell nomeado.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    pub id: String,
    pub command: String,
    /// Timeout específico desta ação, em milissegundos.
    pub timeout_ms: Option<u64>,
    /// Atraso aplicado após qualquer passo que referencie esta ação.
    pub post_delay_ms: Option<u64>,
}

// Valor padrão para o timeout: 30s.
fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for RunbookConfig {
    fn default() -> Self {
        Self {
            abort_on_failure: false,
            default_timeout_ms: default_timeout_ms(),
            default_delay_ms: 0,
            actions: Vec::new(),
        }
    }
}

impl RunbookConfig {
    /// Carrega a configuração do caminho dado.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<RunbookConfig>(&contents)?;
        Ok(config)
    }

    /// Atraso pós-passo configurado para a ação dada, se houver.
    pub fn post_delay_for(&self, action_id: &str) -> Option<u64> {
        self.actions
            .iter()
            .find(|a| a.id == action_id)
            .and_then(|a| a.post_delay_ms)
    }
}
