// ==========================================
// Sistema de Contagens APF - Erros da Camada de API
// ==========================================
// Responsabilidade: converter erros técnicos das camadas internas em
// mensagens de negócio compreensíveis para o chamador.
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Erros da camada de API
///
/// Toda mensagem carrega a causa explícita da falha.
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Erros de regra de negócio
    // ==========================================
    #[error("Método de contagem inválido: {0}")]
    InvalidMethod(String),

    #[error("Nenhuma sessão de importação em andamento para a contagem {0}")]
    SessionNotFound(i64),

    #[error("Recurso não encontrado: {0}")]
    NotFound(String),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Regra de negócio violada: {0}")]
    BusinessRuleViolation(String),

    #[error("Falha de validação de dados: {0}")]
    ValidationError(String),

    // ==========================================
    // Erros de importação
    // ==========================================
    #[error("Falha na importação da planilha: {0}")]
    ImportFailure(#[from] ImportError),

    // ==========================================
    // Erros de acesso a dados
    // ==========================================
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("Falha de conexão com o banco de dados: {0}")]
    DatabaseConnectionError(String),

    #[error("Falha ao persistir dados: {0}")]
    PersistenceFailure(String),

    // ==========================================
    // Erros genéricos
    // ==========================================
    #[error("Erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Conversão a partir de RepositoryError
// Objetivo: traduzir erros técnicos da camada de persistência em erros
// de negócio com mensagem amigável.
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Erros de banco de dados
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) inexistente", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::PersistenceFailure(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("Falha ao adquirir lock do banco: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Violação de unicidade: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!(
                    "Violação de integridade referencial: {}",
                    msg
                ))
            }

            // Erros de qualidade de dados
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                // O método de contagem define qual guia da planilha será lida;
                // um valor fora do domínio vira erro de entrada específico.
                if field == "metodo_contagem" {
                    ApiError::InvalidMethod(message)
                } else {
                    ApiError::InvalidInput(format!("Campo {} inválido: {}", field, message))
                }
            }

            // Erros genéricos
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Alias de Result da API
pub type ApiResult<T> = Result<T, ApiError>;
