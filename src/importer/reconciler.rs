// ==========================================
// Sistema de Contagens APF - Reconciliação de Fatores
// ==========================================
// Compara os tipos de projeto citados na planilha com os fatores de
// ajuste já cadastrados e produz a lista de nomes novos, cada um com
// um multiplicador sugerido extraído da própria planilha.
// ==========================================

use crate::domain::staging::{NewFactorSuggestion, RawRow};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Coluna que nomeia o fator de ajuste de cada linha
pub const PROJECT_TYPE_LABEL: &str = "Tipo Projeto";
/// Coluna com o multiplicador do fator
pub const FACTOR_LABEL: &str = "Fator Ajuste";
/// Variante do rótulo quando a planilha traz o cabeçalho composto
pub const FACTOR_LABEL_FALLBACK: &str = "Fator Ajuste - Fator";

// Linha-guia do modelo de planilha; nunca é um fator real.
const TEMPLATE_PLACEHOLDER: &str = "Só inserir linhas antes desta.";

pub struct AdjustmentReconciler;

impl AdjustmentReconciler {
    /// Nomes de fator presentes na planilha e ausentes do cadastro, na
    /// ordem da primeira ocorrência. Nomes são comparados após trim,
    /// de forma exata.
    pub fn diff(rows: &[RawRow], known_names: &HashSet<String>) -> Vec<NewFactorSuggestion> {
        let factor_column = Self::factor_column(rows);

        let mut unknown: IndexSet<String> = IndexSet::new();
        for row in rows {
            let Some(name) = row.text(PROJECT_TYPE_LABEL) else {
                continue;
            };
            if name == TEMPLATE_PLACEHOLDER {
                continue;
            }
            if known_names.contains(&name) {
                continue;
            }
            unknown.insert(name);
        }

        if !unknown.is_empty() {
            tracing::info!(
                "{} tipo(s) de projeto sem fator cadastrado: {:?}",
                unknown.len(),
                unknown
            );
        }

        unknown
            .into_iter()
            .map(|name| {
                let suggested_multiplier = Self::suggested_multiplier(rows, &name, factor_column);
                NewFactorSuggestion {
                    name,
                    suggested_multiplier,
                }
            })
            .collect()
    }

    /// Rótulo da coluna de multiplicador, decidido uma única vez pela
    /// primeira linha da planilha.
    fn factor_column(rows: &[RawRow]) -> &'static str {
        match rows.first() {
            Some(row) if row.get(FACTOR_LABEL).is_some() => FACTOR_LABEL,
            _ => FACTOR_LABEL_FALLBACK,
        }
    }

    /// Multiplicador da primeira linha que usa o fator; 0.0 quando a
    /// planilha não informa valor numérico.
    fn suggested_multiplier(rows: &[RawRow], name: &str, factor_column: &str) -> f64 {
        rows.iter()
            .find(|row| row.text(PROJECT_TYPE_LABEL).as_deref() == Some(name))
            .and_then(|row| row.get(factor_column))
            .and_then(|cell| cell.as_f64())
            .unwrap_or(0.0)
    }
}
