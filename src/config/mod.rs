// ==========================================
// Sistema de Contagens APF - Camada de Configuração
// ==========================================
// Responsabilidade: parâmetros operacionais do sistema
// Armazenamento: tabela config_kv
// ==========================================

pub mod config_manager;

// Reexporta o gerenciador de configuração
pub use config_manager::{config_keys, ConfigManager};
