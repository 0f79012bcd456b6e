// ==========================================
// Sistema de Contagens APF - Modelos da Importação
// ==========================================
// Estruturas intermediárias do pipeline de importação de planilhas:
// célula bruta → linha bruta → linha mapeada → linha calculada.
// Antes do mapeamento a forma é genérica (rótulo → célula); depois do
// mapeamento os campos são tipados e explícitos.
// ==========================================

use crate::domain::types::{Complexity, FunctionType};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// CellValue - valor bruto de célula
// ==========================================
// Toda célula ausente/vazia vira Empty; nunca zero ou string vazia
// implícitos. JSON: número / string / null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Célula sem conteúdo útil (Empty ou texto só de espaços)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Conteúdo como texto aparado; números são formatados
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => {
                // inteiro exato sem casa decimal ("5", não "5.0")
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Empty => None,
        }
    }

    /// Conteúdo numérico; texto tenta parse (aceita vírgula decimal)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
            }
            CellValue::Empty => None,
        }
    }

    /// Coerção para inteiro com truncamento; não numérico vira 0
    pub fn as_i32_or_zero(&self) -> i32 {
        self.as_f64().map(|v| v.trunc() as i32).unwrap_or(0)
    }
}

// ==========================================
// RawRow - linha bruta da planilha
// ==========================================
// Mapa ordenado rótulo → célula; imutável após a criação.
// row_number é a linha física na planilha (1-based), para mensagens
// de log e diagnóstico.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub row_number: usize,                  // linha física na planilha
    pub cells: IndexMap<String, CellValue>, // rótulo final → valor bruto
}

impl RawRow {
    pub fn new(row_number: usize, cells: IndexMap<String, CellValue>) -> Self {
        Self { row_number, cells }
    }

    /// Valor sob um rótulo (exato)
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells.get(label)
    }

    /// Texto aparado sob um rótulo, se houver conteúdo
    pub fn text(&self, label: &str) -> Option<String> {
        self.cells.get(label).and_then(|c| c.as_text())
    }
}

// ==========================================
// ImportSession - sessão de importação em andamento
// ==========================================
// Uma sessão por contagem; novo upload para a mesma contagem substitui
// a sessão anterior. Descartada no finalize/abandon ou por varredura
// de sessões antigas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    // ===== identidade =====
    pub session_id: String, // UUID v4
    pub count_id: i64,      // contagem associada

    // ===== conteúdo =====
    pub original_filename: String,
    pub raw_rows: Vec<RawRow>,
    pub processed_rows: Option<Vec<ScoredRow>>, // preenchido no map&score

    // ===== auditoria =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportSession {
    pub fn new(count_id: i64, original_filename: String, raw_rows: Vec<RawRow>) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            count_id,
            original_filename,
            raw_rows,
            processed_rows: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marca atividade na sessão (base da varredura de expiração)
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ==========================================
// NewFactorSuggestion - fator novo detectado
// ==========================================
// Saída da reconciliação: nome ainda não cadastrado + multiplicador
// sugerido lido da própria planilha. Nada é persistido sem confirmação
// do operador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFactorSuggestion {
    pub name: String,              // valor distinto de "Tipo Projeto"
    pub suggested_multiplier: f64, // coluna "Fator Ajuste" (0.0 se ausente)
}

// ==========================================
// MappedRow - linha após o mapeamento de colunas
// ==========================================
// Campos necessários ao cálculo, tipados; rótulos mapeados para campos
// desconhecidos ficam em extras (passam adiante sem interpretação).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedRow {
    // ===== origem =====
    pub row_number: usize, // linha física na planilha

    // ===== campos descritivos =====
    pub name: Option<String>,        // nome_funcao
    pub description: Option<String>, // descricao

    // ===== campos do cálculo =====
    pub function_type: FunctionType, // tipo_funcao (ausente → ALI)
    pub data_element_count: i32,     // qtd_der
    pub record_element_count: i32,   // qtd_rlr

    // ===== fator de ajuste resolvido =====
    pub adjustment_factor_name: String,
    pub adjustment_factor_id: Option<i64>, // None quando não resolvido
    pub adjustment_factor_value: f64,      // 1.0 neutro quando não resolvido

    // ===== campos repassados =====
    #[serde(flatten)]
    pub extras: IndexMap<String, CellValue>,
}

// ==========================================
// ScoredRow - linha com pontos calculados
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRow {
    #[serde(flatten)]
    pub mapped: MappedRow,

    pub complexity: Complexity, // resultado da matriz RLR×DER
    pub gross_points: f64,      // pf_bruto
    pub net_points: f64,        // pf_liquido
}

impl ScoredRow {
    /// Linha que caiu fora de todas as faixas da matriz (não INM).
    /// Mantém pontos zerados; a camada de orquestração registra aviso.
    pub fn is_unscored(&self) -> bool {
        self.mapped.function_type != FunctionType::Inm
            && self.complexity == Complexity::NotApplicable
    }
}
