// ==========================================
// Sistema de Contagens APF - Função Contada
// ==========================================
// Registro final de uma função dentro de uma contagem, com pontos já
// calculados. Gravado no finalize da importação (substituição total do
// conjunto da contagem). Alinhado à tabela `funcao`.
// ==========================================

use crate::domain::staging::ScoredRow;
use crate::domain::types::{Complexity, FunctionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// FunctionRecord - entidade persistida
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: Option<i64>, // None antes do insert
    pub count_id: i64,   // coluna `contagem_id` (FK)

    // ===== descrição =====
    pub name: Option<String>,        // coluna `nome`
    pub description: Option<String>, // coluna `descricao`

    // ===== classificação =====
    pub function_type: FunctionType, // coluna `tipo_funcao`
    pub data_element_count: i32,     // coluna `qtd_der`
    pub record_element_count: i32,   // coluna `qtd_rlr`

    // ===== resultado do cálculo =====
    pub adjustment_factor_id: Option<i64>, // coluna `fator_ajuste_id`
    pub complexity: Complexity,            // coluna `complexidade`
    pub gross_points: f64,                 // coluna `pf_bruto`
    pub net_points: f64,                   // coluna `pf_liquido`

    // ===== auditoria =====
    pub created_at: DateTime<Utc>, // coluna `data_criacao`
}

impl FunctionRecord {
    /// Constrói o registro final a partir de uma linha calculada
    pub fn from_scored_row(count_id: i64, row: &ScoredRow) -> Self {
        Self {
            id: None,
            count_id,
            name: row.mapped.name.clone(),
            description: row.mapped.description.clone(),
            function_type: row.mapped.function_type,
            data_element_count: row.mapped.data_element_count,
            record_element_count: row.mapped.record_element_count,
            adjustment_factor_id: row.mapped.adjustment_factor_id,
            complexity: row.complexity,
            gross_points: row.gross_points,
            net_points: row.net_points,
            created_at: Utc::now(),
        }
    }
}
