// ==========================================
// Sistema de Contagens APF - Camada de Aplicação
// ==========================================
// Responsabilidade: montagem do estado compartilhado do processo
// ==========================================

pub mod state;

// Reexporta
pub use state::{get_default_db_path, AppState};
