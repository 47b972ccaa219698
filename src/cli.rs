//! Interface de linha de comando do runbook baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, list)
//! e flags globais (--config, --delay-ms, --abort-on-failure, --verbose).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// runbook — executor sequencial de ações nomeadas.
#[derive(Debug, Parser)]
#[command(name = "runbook", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração.
    #[arg(long, global = true, default_value = "runbook.toml")]
    pub config: PathBuf,

    /// Atraso pós-passo padrão em milissegundos, quando não configurado.
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Interrompe a sequência no primeiro passo que falhar.
    #[arg(long, global = true, default_value_t = false)]
    pub abort_on_failure: bool,

    /// Habilita saída detalhada (registro de auditoria em JSON).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa as ações nomeadas em ordem.
    Run {
        /// Sequência de identificadores de ação, separados por vírgula.
        sequence: String,
    },

    /// Lista as ações registradas na configuração.
    List,
}
