// ==========================================
// Sistema de Contagens APF - Contagem
// ==========================================
// Uma contagem de pontos de função para um cliente/projeto/sistema.
// O método de contagem decide qual guia da planilha é importada.
// Alinhado à tabela `contagem`.
// ==========================================

use crate::domain::types::{CountType, CountingMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Count - entidade persistida
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Count {
    pub id: i64,
    pub description: String,             // coluna `descricao`
    pub count_type: CountType,           // coluna `tipo_contagem`
    pub counting_method: CountingMethod, // coluna `metodo_contagem`

    // ===== vínculos =====
    pub client_id: Option<i64>,  // coluna `cliente_id`
    pub project_id: Option<i64>, // coluna `projeto_id`
    pub system_id: Option<i64>,  // coluna `sistema_id`

    // ===== auditoria =====
    pub created_at: DateTime<Utc>, // coluna `data_criacao`
}

// ==========================================
// NewCount - payload de criação
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCount {
    pub description: String,
    pub count_type: CountType,
    pub counting_method: CountingMethod,
    pub client_id: Option<i64>,
    pub project_id: Option<i64>,
    pub system_id: Option<i64>,
}
