//! Interface de terminal do runbook — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`RunProgress`] acompanha visualmente cada passo
//! da sequência no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::sequence::{RunResult, StepOutcome};

/// Indicador visual de progresso para uma execução de sequência.
///
/// Exibe um spinner animado durante cada passo e uma linha colorida por
/// resultado: sucesso (verde), falha (vermelho) e passo pulado (amarelo).
/// Clonável: o clone compartilha o mesmo spinner subjacente.
#[derive(Clone)]
pub struct RunProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para passos bem-sucedidos.
    green: Style,
    // Estilo vermelho para passos com falha.
    red: Style,
    // Estilo amarelo para passos pulados e avisos.
    yellow: Style,
}

impl RunProgress {
    /// Inicia o spinner e retorna a instância de progresso.
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza a mensagem do spinner para o passo em execução.
    pub fn step_started(&self, action: &str) {
        self.pb.set_message(format!("RUN: {action}"));
    }

    /// Imprime o resultado de um passo acima do spinner.
    pub fn step_finished(&self, action: &str, outcome: &StepOutcome) {
        let line = match outcome {
            StepOutcome::Succeeded => {
                format!("  {} {action}", self.green.apply_to("✓"))
            }
            StepOutcome::Failed(reason) => {
                format!("  {} {action}: {reason}", self.red.apply_to("✗"))
            }
            StepOutcome::Skipped(reason) => {
                format!("  {} {action}: {reason}", self.yellow.apply_to("↷"))
            }
        };
        self.pb.println(line);
    }

    /// Finaliza o spinner e exibe o resumo da execução.
    ///
    /// Execuções canceladas são sinalizadas em amarelo.
    pub fn finish(&self, result: &RunResult) {
        self.pb.finish_and_clear();
        if result.cancelled {
            println!(
                "  {} Run cancelled after {} step(s)",
                self.yellow.apply_to("⏹"),
                result.records.len()
            );
        } else if result.exit_code() == 0 {
            println!(
                "  {} All {} step(s) succeeded",
                self.green.apply_to("✓"),
                result.records.len()
            );
        } else {
            println!(
                "  {} Run finished with failures or skips",
                self.red.apply_to("✗")
            );
        }
    }

    /// Imprime o registro de auditoria formatado em JSON.
    pub fn print_audit(&self, result: &RunResult) {
        let status_style = if result.exit_code() == 0 {
            &self.green
        } else {
            &self.red
        };
        println!();
        println!("{}", status_style.apply_to("─── Run Result ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(result).unwrap_or_default()
        );
    }
}
