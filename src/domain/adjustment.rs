// ==========================================
// Sistema de Contagens APF - Fator de Ajuste
// ==========================================
// Multiplicador nomeado aplicado ao PF bruto. Criado pelo operador
// durante a reconciliação da importação ou pelo CRUD direto.
// Alinhado à tabela `fator_ajuste`.
// ==========================================

use crate::domain::types::AdjustmentKind;
use serde::{Deserialize, Serialize};

// ==========================================
// AdjustmentFactor - entidade persistida
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactor {
    pub id: i64,
    pub name: String,         // nome único (coluna `nome`)
    pub multiplier: f64,      // coluna `fator`
    pub kind: AdjustmentKind, // coluna `tipo_ajuste`
}

// ==========================================
// NewAdjustmentFactor - payload de criação
// ==========================================
// Também é a forma confirmada pelo operador no passo de reconciliação
// (lote atômico: ou todos entram, ou nenhum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdjustmentFactor {
    pub name: String,
    pub multiplier: f64,
    pub kind: AdjustmentKind,
}

// ==========================================
// AdjustmentFactorUpdate - atualização parcial
// ==========================================
// Campos None permanecem inalterados.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustmentFactorUpdate {
    pub name: Option<String>,
    pub multiplier: Option<f64>,
    pub kind: Option<AdjustmentKind>,
}

impl AdjustmentFactorUpdate {
    /// Atualização sem nenhum campo preenchido
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.multiplier.is_none() && self.kind.is_none()
    }
}
