// ==========================================
// Sistema de Contagens APF - Estado da Aplicação
// ==========================================
// Responsabilidade: montar e compartilhar as instâncias de API,
// repositórios e staging sobre uma conexão única de banco.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AdjustmentFactorApi, CountApi, ImportApi};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::repository::{
    AdjustmentFactorRepositoryImpl, CountRepository, FunctionRepository, RegistryRepository,
};
use crate::staging::StagingStore;

/// Estado da aplicação
///
/// Reúne as APIs e os recursos compartilhados construídos sobre a
/// mesma conexão SQLite.
pub struct AppState {
    /// Caminho do banco de dados
    pub db_path: String,

    /// API de importação de planilhas
    pub import_api: Arc<ImportApi<AdjustmentFactorRepositoryImpl>>,

    /// API de cadastro de fatores de ajuste
    pub adjustment_factor_api: Arc<AdjustmentFactorApi<AdjustmentFactorRepositoryImpl>>,

    /// API de contagens
    pub count_api: Arc<CountApi>,

    /// Cadastro de clientes, projetos e sistemas
    pub registry_repo: Arc<RegistryRepository>,

    /// Sessões de importação em andamento
    pub staging: Arc<StagingStore>,

    /// Parâmetros operacionais
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// Cria uma nova instância de AppState
    ///
    /// # Parâmetros
    /// - db_path: caminho do arquivo de banco de dados
    ///
    /// # Retorno
    /// - Ok(AppState): estado pronto para uso
    /// - Err(String): erro de inicialização
    ///
    /// # Observações
    /// Os repositórios são criados na ordem das dependências de chave
    /// estrangeira (cadastro → fator de ajuste → contagem → função),
    /// de modo que o DDL idempotente de cada um encontre as tabelas
    /// referenciadas já existentes.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("Inicializando AppState, banco de dados: {}", db_path);

        // Conexão única compartilhada entre os repositórios
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("Não foi possível abrir o banco de dados: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Camada de repositórios
        // ==========================================

        let registry_repo = Arc::new(
            RegistryRepository::from_connection(conn.clone())
                .map_err(|e| format!("Não foi possível criar RegistryRepository: {}", e))?,
        );

        let factor_repo = Arc::new(
            AdjustmentFactorRepositoryImpl::from_connection(conn.clone()).map_err(|e| {
                format!("Não foi possível criar AdjustmentFactorRepository: {}", e)
            })?,
        );

        let count_repo = Arc::new(
            CountRepository::from_connection(conn.clone())
                .map_err(|e| format!("Não foi possível criar CountRepository: {}", e))?,
        );

        let function_repo = Arc::new(
            FunctionRepository::from_connection(conn.clone())
                .map_err(|e| format!("Não foi possível criar FunctionRepository: {}", e))?,
        );

        // ==========================================
        // Configuração e staging
        // ==========================================

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("Não foi possível criar ConfigManager: {}", e))?,
        );

        let staging = Arc::new(StagingStore::new());

        // ==========================================
        // Camada de API
        // ==========================================

        let count_api = Arc::new(CountApi::new(count_repo.clone(), function_repo.clone()));

        let adjustment_factor_api = Arc::new(AdjustmentFactorApi::new(factor_repo.clone()));

        let import_api = Arc::new(ImportApi::new(
            staging.clone(),
            factor_repo,
            count_repo,
            function_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState inicializado");

        Ok(Self {
            db_path,
            import_api,
            adjustment_factor_api,
            count_api,
            registry_repo,
            staging,
            config_manager,
        })
    }

    /// Caminho do banco de dados em uso
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// Caminho padrão do banco de dados
// ==========================================

/// Resolve o caminho padrão do banco de dados
///
/// # Retorno
/// - Ambiente de desenvolvimento: diretório de dados do usuário/apf-contagens-dev/apf_contagens.db
/// - Ambiente de produção: diretório de dados do usuário/apf-contagens/apf_contagens.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // A variável de ambiente tem precedência (depuração/testes/CI)
    if let Ok(path) = std::env::var("APF_CONTAGENS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // Valor de recuo caso o diretório de dados do usuário não exista
    let mut path = PathBuf::from("./apf_contagens.db");

    if let Some(data_dir) = dirs::data_dir() {
        // Desenvolvimento usa diretório separado para não tocar dados reais
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("apf-contagens-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("apf-contagens");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("apf_contagens.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_inicializa_com_banco_novo() {
        let dir = tempfile::tempdir().expect("Falha ao criar diretório temporário");
        let db_path = dir.path().join("apf_contagens.db");

        let state = AppState::new(db_path.to_string_lossy().to_string())
            .expect("Falha ao inicializar AppState");

        assert!(state.staging.is_empty());
        assert!(state.get_db_path().ends_with("apf_contagens.db"));
    }
}
