// ==========================================
// Sistema de Contagens APF - Tipos de Domínio
// ==========================================
// Enums centrais do domínio de contagem de pontos de função.
// Serialização: mesmos literais gravados no banco e expostos na API.
// Parse: sempre falível (FromStr), nunca valor padrão silencioso.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// Erro de parse de enum
// ==========================================
// Valores vêm de texto livre (planilha, banco); um literal fora do
// conjunto conhecido precisa ser um erro explícito.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("valor não reconhecido para {field}: '{value}'")]
pub struct UnrecognizedValue {
    /// Nome do campo/enum de destino
    pub field: &'static str,
    /// Valor recebido (já com trim aplicado)
    pub value: String,
}

impl UnrecognizedValue {
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.trim().to_string(),
        }
    }
}

// ==========================================
// Método de Contagem (Counting Method)
// ==========================================
// Determina a guia da planilha lida na importação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountingMethod {
    Detalhada, // contagem detalhada (guia "AFP - Detalhada")
    Estimada,  // contagem estimada (guia "AFP - Estimativa")
}

impl fmt::Display for CountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountingMethod::Detalhada => write!(f, "Detalhada"),
            CountingMethod::Estimada => write!(f, "Estimada"),
        }
    }
}

impl CountingMethod {
    /// Literal gravado na coluna `contagem.metodo_contagem`
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CountingMethod::Detalhada => "Detalhada",
            CountingMethod::Estimada => "Estimada",
        }
    }
}

impl FromStr for CountingMethod {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DETALHADA" => Ok(CountingMethod::Detalhada),
            "ESTIMADA" => Ok(CountingMethod::Estimada),
            _ => Err(UnrecognizedValue::new("metodo_contagem", s)),
        }
    }
}

// ==========================================
// Tipo de Contagem (Count Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountType {
    Desenvolvimento, // projeto de desenvolvimento
    Melhoria,        // projeto de melhoria
    #[serde(rename = "Aplicação")]
    Aplicacao, // contagem de aplicação instalada
}

impl fmt::Display for CountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountType::Desenvolvimento => write!(f, "Desenvolvimento"),
            CountType::Melhoria => write!(f, "Melhoria"),
            CountType::Aplicacao => write!(f, "Aplicação"),
        }
    }
}

impl CountType {
    /// Literal gravado na coluna `contagem.tipo_contagem`
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CountType::Desenvolvimento => "Desenvolvimento",
            CountType::Melhoria => "Melhoria",
            CountType::Aplicacao => "Aplicação",
        }
    }
}

impl FromStr for CountType {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DESENVOLVIMENTO" => Ok(CountType::Desenvolvimento),
            "MELHORIA" => Ok(CountType::Melhoria),
            "APLICAÇÃO" | "APLICACAO" => Ok(CountType::Aplicacao),
            _ => Err(UnrecognizedValue::new("tipo_contagem", s)),
        }
    }
}

// ==========================================
// Tipo de Função (Function Type)
// ==========================================
// Conjunto fixo da APF; seleciona a matriz de complexidade e a tabela
// de pesos. INM é linear (sem complexidade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionType {
    Ali, // Arquivo Lógico Interno
    Aie, // Arquivo de Interface Externa
    Ee,  // Entrada Externa
    Ce,  // Consulta Externa
    Se,  // Saída Externa
    Inm, // Item Não Mensurável (multiplicador linear)
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FunctionType {
    /// Literal gravado na coluna `funcao.tipo_funcao`
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FunctionType::Ali => "ALI",
            FunctionType::Aie => "AIE",
            FunctionType::Ee => "EE",
            FunctionType::Ce => "CE",
            FunctionType::Se => "SE",
            FunctionType::Inm => "INM",
        }
    }

    /// Tipos de dados (ALI/AIE) versus tipos transacionais
    pub fn is_data_function(&self) -> bool {
        matches!(self, FunctionType::Ali | FunctionType::Aie)
    }
}

impl FromStr for FunctionType {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALI" => Ok(FunctionType::Ali),
            "AIE" => Ok(FunctionType::Aie),
            "EE" => Ok(FunctionType::Ee),
            "CE" => Ok(FunctionType::Ce),
            "SE" => Ok(FunctionType::Se),
            "INM" => Ok(FunctionType::Inm),
            _ => Err(UnrecognizedValue::new("tipo_funcao", s)),
        }
    }
}

// ==========================================
// Complexidade Funcional (Complexity)
// ==========================================
// Resultado da matriz RLR×DER; "N/A" cobre INM e linhas fora de faixa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Baixa,
    #[serde(rename = "Média")]
    Media,
    Alta,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Complexity {
    /// Literal gravado na coluna `funcao.complexidade`
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Complexity::Baixa => "Baixa",
            Complexity::Media => "Média",
            Complexity::Alta => "Alta",
            Complexity::NotApplicable => "N/A",
        }
    }
}

impl FromStr for Complexity {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BAIXA" => Ok(Complexity::Baixa),
            // aceita grafia sem acento vinda de texto livre
            "MÉDIA" | "MEDIA" => Ok(Complexity::Media),
            "ALTA" => Ok(Complexity::Alta),
            "N/A" => Ok(Complexity::NotApplicable),
            _ => Err(UnrecognizedValue::new("complexidade", s)),
        }
    }
}

// ==========================================
// Tipo de Ajuste (Adjustment Kind)
// ==========================================
// Natureza do fator de ajuste: percentual sobre o bruto ou valor
// unitário por item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    Percentual,
    Unitario,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AdjustmentKind {
    /// Literal gravado na coluna `fator_ajuste.tipo_ajuste`
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Percentual => "PERCENTUAL",
            AdjustmentKind::Unitario => "UNITARIO",
        }
    }
}

impl FromStr for AdjustmentKind {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PERCENTUAL" => Ok(AdjustmentKind::Percentual),
            "UNITARIO" | "UNITÁRIO" => Ok(AdjustmentKind::Unitario),
            _ => Err(UnrecognizedValue::new("tipo_ajuste", s)),
        }
    }
}
