// ==========================================
// Sistema de Contagens APF - Camada de API
// ==========================================
// Responsabilidade: operações de negócio independentes de transporte,
// na forma requisição → resposta.
// ==========================================

pub mod adjustment_factor_api;
pub mod count_api;
pub mod error;
pub mod import_api;

// Reexporta os tipos centrais
pub use adjustment_factor_api::AdjustmentFactorApi;
pub use count_api::CountApi;
pub use error::{ApiError, ApiResult};
pub use import_api::{
    AbandonResponse, ConfirmFactorsResponse, FinalizeResponse, ImportApi, ImportSheetResponse,
    MapScoreResponse, ReconcileResponse,
};
