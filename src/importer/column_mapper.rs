// ==========================================
// Sistema de Contagens APF - Mapeamento de Colunas
// ==========================================
// Aplica o mapeamento rótulo-da-planilha → campo-do-domínio definido
// pelo operador sobre as linhas brutas em staging. Linhas sem fator de
// ajuste são puladas; fator não cadastrado não derruba a linha (segue
// com multiplicador neutro). Campos de destino fora do vocabulário
// conhecido passam adiante sem interpretação.
// ==========================================

use crate::domain::adjustment::AdjustmentFactor;
use crate::domain::staging::{CellValue, MappedRow, RawRow};
use crate::domain::types::FunctionType;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::str::FromStr;

/// Campos de domínio reconhecidos pelo mapeamento
pub mod fields {
    pub const FUNCTION_NAME: &str = "nome_funcao";
    pub const DESCRIPTION: &str = "descricao";
    pub const FUNCTION_TYPE: &str = "tipo_funcao";
    pub const DER_COUNT: &str = "qtd_der";
    pub const RLR_COUNT: &str = "qtd_rlr";
    pub const FACTOR_NAME: &str = "nome_fator_ajuste";
}

pub struct ColumnMapper;

impl ColumnMapper {
    /// Traduz cada linha bruta para uma MappedRow. Rótulos ausentes do
    /// mapeamento são descartados; o fator de ajuste é resolvido contra
    /// o cadastro completo (já incluindo os recém-criados).
    pub fn apply(
        mapping: &IndexMap<String, String>,
        rows: &[RawRow],
        factors: &HashMap<String, AdjustmentFactor>,
    ) -> Vec<MappedRow> {
        let mut mapped = Vec::with_capacity(rows.len());

        for row in rows {
            match Self::map_row(mapping, row, factors) {
                Some(m) => mapped.push(m),
                None => continue,
            }
        }

        tracing::info!(
            "mapeamento aplicado: {} de {} linha(s) aproveitada(s)",
            mapped.len(),
            rows.len()
        );
        mapped
    }

    fn map_row(
        mapping: &IndexMap<String, String>,
        row: &RawRow,
        factors: &HashMap<String, AdjustmentFactor>,
    ) -> Option<MappedRow> {
        let mut name: Option<String> = None;
        let mut description: Option<String> = None;
        let mut type_text: Option<String> = None;
        let mut data_element_count = 0i32;
        let mut record_element_count = 0i32;
        let mut factor_name: Option<String> = None;
        let mut extras: IndexMap<String, CellValue> = IndexMap::new();

        for (label, field) in mapping {
            let Some(cell) = row.get(label) else {
                continue;
            };
            match field.as_str() {
                fields::FUNCTION_NAME => name = cell.as_text(),
                fields::DESCRIPTION => description = cell.as_text(),
                fields::FUNCTION_TYPE => type_text = cell.as_text(),
                fields::DER_COUNT => data_element_count = cell.as_i32_or_zero(),
                fields::RLR_COUNT => record_element_count = cell.as_i32_or_zero(),
                fields::FACTOR_NAME => factor_name = cell.as_text(),
                _ => {
                    extras.insert(field.clone(), cell.clone());
                }
            }
        }

        // Sem nome de fator a linha não participa do cálculo.
        let Some(factor_name) = factor_name else {
            tracing::debug!("linha {} sem fator de ajuste, pulando", row.row_number);
            return None;
        };

        let (adjustment_factor_id, adjustment_factor_value) = match factors.get(&factor_name) {
            Some(factor) => (Some(factor.id), factor.multiplier),
            None => {
                tracing::warn!(
                    "linha {}: fator de ajuste '{}' não cadastrado, usando multiplicador neutro",
                    row.row_number,
                    factor_name
                );
                (None, 1.0)
            }
        };

        let function_type = match type_text {
            None => FunctionType::Ali,
            Some(text) => match FunctionType::from_str(&text) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("linha {}: {}, pulando", row.row_number, e);
                    return None;
                }
            },
        };

        Some(MappedRow {
            row_number: row.row_number,
            name,
            description,
            function_type,
            data_element_count,
            record_element_count,
            adjustment_factor_name: factor_name,
            adjustment_factor_id,
            adjustment_factor_value,
            extras,
        })
    }
}
