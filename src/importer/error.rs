// ==========================================
// Sistema de Contagens APF - Erros da Importação
// ==========================================
// Ferramenta: macro derive do thiserror
// Qualquer falha aqui aborta a importação sem deixar estado parcial.
// ==========================================

use thiserror::Error;

/// Erros do pipeline de importação de planilhas
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== estrutura do arquivo =====
    #[error("falha ao ler a pasta de trabalho: {0}")]
    WorkbookParse(String),

    #[error("guia '{0}' não encontrada no arquivo enviado")]
    SheetNotFound(String),

    #[error("guia '{0}' não contém nenhuma célula")]
    EmptySheet(String),

    // ===== genérico =====
    #[error("erro interno na importação: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Falhas do calamine (zip corrompido, XML inválido, guia ilegível)
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::WorkbookParse(err.to_string())
    }
}

/// Alias de Result da importação
pub type ImportResult<T> = Result<T, ImportError>;
