// ==========================================
// Sistema de Contagens APF - API de Fatores de Ajuste
// ==========================================
// Responsabilidade: CRUD de fator de ajuste para o cadastro mantido
// pelo operador. A reconciliação da importação cria fatores em lote
// pela ImportApi; aqui ficam as operações unitárias.
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::adjustment::{AdjustmentFactor, AdjustmentFactorUpdate, NewAdjustmentFactor};
use crate::repository::AdjustmentFactorRepository;

/// API de cadastro de fatores de ajuste
pub struct AdjustmentFactorApi<F: AdjustmentFactorRepository> {
    factor_repo: Arc<F>,
}

impl<F: AdjustmentFactorRepository> AdjustmentFactorApi<F> {
    /// Cria uma nova instância de AdjustmentFactorApi
    pub fn new(factor_repo: Arc<F>) -> Self {
        Self { factor_repo }
    }

    /// Cadastra um fator de ajuste
    ///
    /// # Retorno
    /// - Ok(AdjustmentFactor): registro criado, com id
    /// - Err(ApiError): nome vazio ou já cadastrado
    pub async fn create(&self, factor: NewAdjustmentFactor) -> ApiResult<AdjustmentFactor> {
        // 1. Validação de entrada
        let name = factor.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput(
                "Nome do fator de ajuste não pode ser vazio".to_string(),
            ));
        }

        // 2. Conflito de nome com mensagem clara antes do UNIQUE do banco
        if self.factor_repo.find_by_name(name).await?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "Já existe um fator de ajuste com o nome '{}'",
                name
            )));
        }

        // 3. Persistência
        let created = self
            .factor_repo
            .create(NewAdjustmentFactor {
                name: name.to_string(),
                ..factor
            })
            .await?;

        tracing::info!(
            factor_id = created.id,
            name = %created.name,
            "fator de ajuste cadastrado"
        );

        Ok(created)
    }

    /// Busca um fator de ajuste por id
    pub async fn get(&self, id: i64) -> ApiResult<AdjustmentFactor> {
        self.factor_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Fator de ajuste não encontrado".to_string()))
    }

    /// Atualização parcial de um fator de ajuste
    ///
    /// Campos não informados permanecem como estão; atualização sem
    /// nenhum campo devolve o registro atual sem alteração.
    pub async fn update(
        &self,
        id: i64,
        changes: AdjustmentFactorUpdate,
    ) -> ApiResult<AdjustmentFactor> {
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput(
                    "Nome do fator de ajuste não pode ser vazio".to_string(),
                ));
            }
        }

        let updated = self.factor_repo.update(id, changes).await?;

        tracing::info!(factor_id = id, "fator de ajuste atualizado");

        Ok(updated)
    }

    /// Remove um fator de ajuste por id
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.factor_repo.delete(id).await?;

        tracing::info!(factor_id = id, "fator de ajuste removido");

        Ok(())
    }
}
