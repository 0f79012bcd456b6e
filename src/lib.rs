// ==========================================
// Sistema de Contagens APF - Biblioteca Central
// ==========================================
// Gerenciamento de contagens de pontos de função: importação de
// planilhas em etapas, reconciliação de fatores de ajuste, mapeamento
// de colunas e cálculo de PF bruto/líquido.
// Stack: Rust + SQLite
// ==========================================

// ==========================================
// Declaração de módulos
// ==========================================

// Camada de domínio - entidades e tipos
pub mod domain;

// Camada de repositórios - acesso a dados
pub mod repository;

// Camada de cálculo - regras de pontuação
pub mod engine;

// Camada de importação - leitura de planilhas
pub mod importer;

// Staging - sessões de importação em andamento
pub mod staging;

// Camada de configuração - parâmetros operacionais
pub mod config;

// Infraestrutura de banco (inicialização de conexão/PRAGMA)
pub mod db;

// Sistema de logs
pub mod logging;

// Camada de API - operações de negócio
pub mod api;

// Camada de aplicação - estado compartilhado
pub mod app;

// ==========================================
// Reexporta os tipos centrais
// ==========================================

// Tipos de domínio
pub use domain::types::{AdjustmentKind, Complexity, CountType, CountingMethod, FunctionType};

// Entidades de domínio
pub use domain::{
    AdjustmentFactor, AdjustmentFactorUpdate, CellValue, Client, Count, FunctionRecord,
    ImportSession, MappedRow, NewAdjustmentFactor, NewCount, NewFactorSuggestion, Project, RawRow,
    ScoredRow, SystemEntity,
};

// Motor de pontuação
pub use engine::ScoringEngine;

// Importação
pub use importer::{
    AdjustmentReconciler, ColumnMapper, HeaderReconstructor, ImportError, ImportResult,
    LoadedSheet, SheetLoader,
};

// Staging
pub use staging::StagingStore;

// API
pub use api::{AdjustmentFactorApi, ApiError, ApiResult, CountApi, ImportApi};

// ==========================================
// Constantes do sistema
// ==========================================

// Versão do sistema
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Nome do sistema
pub const APP_NAME: &str = "Sistema de Contagens APF";

// ==========================================
// Verificação de compilação
// ==========================================

// Garante que todos os módulos estão visíveis em tempo de compilação
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "Sistema de Contagens APF");
    }
}
